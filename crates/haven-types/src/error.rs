use thiserror::Error;

use crate::llm::LlmError;

/// Errors related to account registration, login, and token checks.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username '{0}' already exists")]
    UsernameTaken(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("invalid password: {0}")]
    InvalidPassword(String),

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("password hashing failed")]
    Hashing,

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors related to chat session management.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,

    #[error("invalid session name: {0}")]
    InvalidName(String),

    #[error("session name '{0}' already exists")]
    NameConflict(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from sending a chat message.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message must not be empty")]
    EmptyMessage,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("llm error: {0}")]
    Llm(#[from] LlmError),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from repository operations (used by trait definitions in haven-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<RepositoryError> for SessionError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => SessionError::NotFound,
            RepositoryError::Conflict(name) => SessionError::NameConflict(name),
            other => SessionError::Storage(other.to_string()),
        }
    }
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ChatError::Session(SessionError::NotFound),
            other => ChatError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = AuthError::UsernameTaken("mira".to_string());
        assert_eq!(err.to_string(), "username 'mira' already exists");
    }

    #[test]
    fn test_invalid_credentials_is_generic() {
        // Must not reveal whether the username exists.
        let msg = AuthError::InvalidCredentials.to_string();
        assert_eq!(msg, "invalid username or password");
    }

    #[test]
    fn test_repository_error_into_session_error() {
        assert!(matches!(
            SessionError::from(RepositoryError::NotFound),
            SessionError::NotFound
        ));
        assert!(matches!(
            SessionError::from(RepositoryError::Conflict("x".into())),
            SessionError::NameConflict(_)
        ));
        assert!(matches!(
            SessionError::from(RepositoryError::Query("boom".into())),
            SessionError::Storage(_)
        ));
    }

    #[test]
    fn test_repository_error_into_chat_error() {
        assert!(matches!(
            ChatError::from(RepositoryError::NotFound),
            ChatError::Session(SessionError::NotFound)
        ));
        assert!(matches!(
            ChatError::from(RepositoryError::Connection),
            ChatError::Storage(_)
        ));
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }
}
