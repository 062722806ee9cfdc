//! Session CRUD HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/v1/sessions               - List the user's sessions, newest first
//! - POST   /api/v1/sessions               - Create a session
//! - GET    /api/v1/sessions/{id}          - Get a single session
//! - PUT    /api/v1/sessions/{id}          - Rename a session
//! - DELETE /api/v1/sessions/{id}          - Delete a session and its messages
//! - GET    /api/v1/sessions/{id}/messages - Messages of a session, oldest first

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use haven_types::chat::{ChatMessage, ChatSession};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::extractors::query::PageQuery;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for session creation. Without a name the session is named
/// after the current time.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameSessionRequest {
    pub name: String,
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

fn session_response(session: ChatSession, request_id: String, elapsed: u64) -> ApiResponse<ChatSession> {
    let id = session.id;
    ApiResponse::success(session, request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{id}"))
        .with_link("messages", &format!("/api/v1/sessions/{id}/messages"))
        .with_link("analytics", &format!("/api/v1/sessions/{id}/analytics"))
}

/// GET /api/v1/sessions - List the user's sessions.
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<ChatSession>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sessions = state.chat_service.list_sessions(&auth.user).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(
        ApiResponse::success(sessions, request_id, elapsed).with_link("self", "/api/v1/sessions"),
    ))
}

/// POST /api/v1/sessions - Create a session.
pub async fn create_session(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Option<Json<CreateSessionRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<ChatSession>>), AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let name = body.and_then(|Json(b)| b.name);
    let session = state
        .chat_service
        .create_session(&auth.user, name.as_deref())
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok((StatusCode::CREATED, Json(session_response(session, request_id, elapsed))))
}

/// GET /api/v1/sessions/{id} - Get a session by ID.
pub async fn get_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<ChatSession>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let session = state.chat_service.get_session(&auth.user, &sid).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(session_response(session, request_id, elapsed)))
}

/// PUT /api/v1/sessions/{id} - Rename a session.
pub async fn rename_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<String>,
    Json(body): Json<RenameSessionRequest>,
) -> Result<Json<ApiResponse<ChatSession>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let session = state
        .chat_service
        .rename_session(&auth.user, &sid, &body.name)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(session_response(session, request_id, elapsed)))
}

/// DELETE /api/v1/sessions/{id} - Delete a session and its messages.
pub async fn delete_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    state.chat_service.delete_session(&auth.user, &sid).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": true, "session_id": sid }),
        request_id,
        elapsed,
    )))
}

/// GET /api/v1/sessions/{id}/messages - Messages of a session.
pub async fn get_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    query.validate()?;
    let sid = parse_uuid(&session_id)?;
    let messages = state
        .chat_service
        .load_messages(&auth.user, &sid, query.limit, query.offset)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(messages, request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{sid}/messages"))
        .with_link("session", &format!("/api/v1/sessions/{sid}"));

    Ok(Json(resp))
}
