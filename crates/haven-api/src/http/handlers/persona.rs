//! GET /api/v1/personas - The companion personas.

use std::time::Instant;

use axum::Json;
use uuid::Uuid;

use haven_types::persona::{Persona, PersonaInfo};

use crate::http::response::ApiResponse;

pub async fn list_personas() -> Json<ApiResponse<Vec<PersonaInfo>>> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let personas: Vec<PersonaInfo> = Persona::ALL.into_iter().map(PersonaInfo::from).collect();
    let elapsed = start.elapsed().as_millis() as u64;

    Json(ApiResponse::success(personas, request_id, elapsed).with_link("self", "/api/v1/personas"))
}
