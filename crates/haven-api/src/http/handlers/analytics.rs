//! Analytics handlers.
//!
//! - GET /api/v1/sessions/{id}/analytics - Assessment of one session
//! - GET /api/v1/analytics               - Assessment across all of the user's sessions
//!
//! Both always succeed once the session is found: without a model (or when
//! the model fails) the keyword fallback produces the assessment.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use haven_core::analytics::service::AnalyticsReport;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::handlers::session::parse_uuid;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/sessions/{id}/analytics
pub async fn session_analytics(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<AnalyticsReport>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let report = state
        .analytics_service
        .session_analytics(&auth.user, &sid)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(report, request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{sid}/analytics"))
        .with_link("session", &format!("/api/v1/sessions/{sid}"));

    Ok(Json(resp))
}

/// GET /api/v1/analytics
pub async fn overall_analytics(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<AnalyticsReport>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let report = state.analytics_service.overall_analytics(&auth.user).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(
        ApiResponse::success(report, request_id, elapsed).with_link("self", "/api/v1/analytics"),
    ))
}
