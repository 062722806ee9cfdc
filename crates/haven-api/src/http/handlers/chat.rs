//! Chat endpoints: blocking reply and SSE streaming reply.
//!
//! - POST /api/v1/sessions/{id}/messages        - Send a message, get the stored reply
//! - POST /api/v1/sessions/{id}/messages/stream - Send a message, stream the reply
//!
//! SSE event types:
//! - `text_delta` - incremental text: `{ "text": "..." }`
//! - `message` - the persisted reply (a `ChatMessage`)
//! - `error` - error occurred: `{ "code": "...", "message": "..." }`
//! - `done` - stream complete: `{}`

use std::convert::Infallible;
use std::time::{Duration, Instant};

use axum::Json;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_stream::Stream;
use uuid::Uuid;

use haven_core::chat::service::{ChatEventStream, ChatStreamEvent};
use haven_types::chat::ChatMessage;
use haven_types::persona::Persona;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::handlers::session::parse_uuid;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for both chat endpoints.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
    /// Persona slug (`counselor`, `listener`, `coach`, `cbt`). Defaults to the counselor.
    #[serde(default)]
    pub persona: Persona,
}

/// POST /api/v1/sessions/{id}/messages - Send a message and wait for the reply.
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<ChatMessage>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let reply = state
        .chat_service
        .send_message(&auth.user, &sid, &body.message, body.persona)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(reply, request_id, elapsed)
        .with_link("messages", &format!("/api/v1/sessions/{sid}/messages"));

    Ok(Json(resp))
}

/// POST /api/v1/sessions/{id}/messages/stream - SSE streaming chat.
///
/// Validation and ownership errors are returned as a normal error response
/// before the stream opens. Failures after that arrive as an `error` event.
pub async fn stream_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let sid = parse_uuid(&session_id)?;
    let events = state
        .chat_service
        .stream_message(&auth.user, &sid, &body.message, body.persona)
        .await?;

    Ok(Sse::new(sse_events(events)).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

fn error_event(code: &str, message: &str) -> Event {
    let data = serde_json::json!({ "code": code, "message": message });
    Event::default().event("error").data(data.to_string())
}

/// Translate chat stream events into SSE events, always ending with `done`.
fn sse_events(mut events: ChatEventStream) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        while let Some(item) = events.next().await {
            match item {
                Ok(ChatStreamEvent::TextDelta { text }) => {
                    let data = serde_json::json!({ "text": text });
                    yield Ok::<_, Infallible>(Event::default().event("text_delta").data(data.to_string()));
                }
                Ok(ChatStreamEvent::Message { message }) => {
                    match Event::default().event("message").json_data(&message) {
                        Ok(event) => yield Ok(event),
                        Err(e) => yield Ok(error_event("INTERNAL_ERROR", &e.to_string())),
                    }
                }
                Err(e) => {
                    let (_, code, message) = AppError::from(e).parts();
                    tracing::warn!(code, %message, "Chat stream failed");
                    yield Ok(error_event(code, &message));
                    break;
                }
            }
        }

        yield Ok(Event::default().event("done").data("{}"));
    }
}
