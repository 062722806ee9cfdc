//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use haven_types::error::{AuthError, ChatError, SessionError};
use haven_types::llm::LlmError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Auth(AuthError),
    Session(SessionError),
    Chat(ChatError),
    /// Missing or unusable credentials on the request.
    Unauthorized(String),
    Validation(String),
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

fn session_parts(e: &SessionError) -> (StatusCode, &'static str, String) {
    match e {
        SessionError::NotFound => (
            StatusCode::NOT_FOUND,
            "SESSION_NOT_FOUND",
            "Session not found".to_string(),
        ),
        SessionError::InvalidName(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
        SessionError::NameConflict(_) => (StatusCode::CONFLICT, "CONFLICT", e.to_string()),
        SessionError::Storage(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            e.to_string(),
        ),
    }
}

/// Status, code and message for an LLM failure.
pub fn llm_parts(e: &LlmError) -> (StatusCode, &'static str, String) {
    match e {
        LlmError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", e.to_string()),
        _ => (StatusCode::BAD_GATEWAY, "LLM_ERROR", e.to_string()),
    }
}

impl AppError {
    /// Status, machine-readable code and message for this error.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Auth(e @ AuthError::UsernameTaken(_)) => {
                (StatusCode::CONFLICT, "USERNAME_TAKEN", e.to_string())
            }
            AppError::Auth(e @ AuthError::InvalidCredentials) => {
                (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", e.to_string())
            }
            AppError::Auth(e @ AuthError::InvalidToken) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", e.to_string())
            }
            AppError::Auth(e @ (AuthError::InvalidUsername(_) | AuthError::InvalidPassword(_))) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Auth(e) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", e.to_string()),
            AppError::Session(e) => session_parts(e),
            AppError::Chat(ChatError::EmptyMessage) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                ChatError::EmptyMessage.to_string(),
            ),
            AppError::Chat(ChatError::Session(e)) => session_parts(e),
            AppError::Chat(ChatError::Llm(e)) => llm_parts(e),
            AppError::Chat(e @ ChatError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", e.to_string())
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, %message, "Request failed");
        }

        let body = ApiResponse::error(code, &message, uuid::Uuid::now_v7().to_string());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_and_code(e: AppError) -> (StatusCode, &'static str) {
        let (status, code, _) = e.parts();
        (status, code)
    }

    #[test]
    fn auth_errors_map_to_table() {
        assert_eq!(
            status_and_code(AuthError::UsernameTaken("mira".into()).into()),
            (StatusCode::CONFLICT, "USERNAME_TAKEN")
        );
        assert_eq!(
            status_and_code(AuthError::InvalidCredentials.into()),
            (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
        );
        assert_eq!(
            status_and_code(AuthError::InvalidToken.into()),
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
        );
        assert_eq!(
            status_and_code(AuthError::InvalidPassword("too short".into()).into()),
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        );
        assert_eq!(
            status_and_code(AuthError::Storage("disk".into()).into()),
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        );
    }

    #[test]
    fn session_and_chat_errors_map_to_table() {
        assert_eq!(
            status_and_code(SessionError::NotFound.into()),
            (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND")
        );
        assert_eq!(
            status_and_code(ChatError::Session(SessionError::NotFound).into()),
            (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND")
        );
        assert_eq!(
            status_and_code(SessionError::NameConflict("x".into()).into()),
            (StatusCode::CONFLICT, "CONFLICT")
        );
        assert_eq!(
            status_and_code(ChatError::EmptyMessage.into()),
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        );
        assert_eq!(
            status_and_code(ChatError::Llm(LlmError::RateLimited { retry_after_ms: None }).into()),
            (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED")
        );
        assert_eq!(
            status_and_code(ChatError::Llm(LlmError::AuthenticationFailed).into()),
            (StatusCode::BAD_GATEWAY, "LLM_ERROR")
        );
    }
}
