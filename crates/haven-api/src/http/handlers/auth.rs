//! Account and login handlers.
//!
//! Endpoints:
//! - POST /api/v1/auth/register - Create an account
//! - POST /api/v1/auth/login    - Exchange credentials for a token
//! - POST /api/v1/auth/logout   - Revoke the presented token
//! - GET  /api/v1/me            - Current user with usage totals

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use haven_types::user::User;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for register and login.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Plaintext bearer token. Shown once.
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub session_count: u64,
    pub message_count: u64,
}

/// POST /api/v1/auth/register - Create an account.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let user = state.auth_service.register(&body.username, &body.password).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(user, request_id, elapsed)
        .with_link("login", "/api/v1/auth/login");

    Ok((StatusCode::CREATED, Json(resp)))
}

/// POST /api/v1/auth/login - Exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (user, token) = state.auth_service.login(&body.username, &body.password).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(LoginResponse { token, user }, request_id, elapsed)
        .with_link("me", "/api/v1/me")
        .with_link("sessions", "/api/v1/sessions");

    Ok(Json(resp))
}

/// POST /api/v1/auth/logout - Revoke the token used for this request.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    state.auth_service.logout(&auth.token).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "logged_out": true }),
        request_id,
        elapsed,
    )))
}

/// GET /api/v1/me - The authenticated user.
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MeResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (session_count, message_count) = state.chat_service.stats(&auth.user).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(
        MeResponse {
            user: auth.user,
            session_count,
            message_count,
        },
        request_id,
        elapsed,
    )
    .with_link("self", "/api/v1/me")
    .with_link("sessions", "/api/v1/sessions")
    .with_link("analytics", "/api/v1/analytics");

    Ok(Json(resp))
}
