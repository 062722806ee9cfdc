//! Chat session and message types for Haven.
//!
//! These types model conversations between a user and the companion:
//! sessions owned by a user, and the messages exchanged within them.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::persona::Persona;

// Re-export MessageRole from llm module (it's used in both chat and llm contexts).
pub use crate::llm::MessageRole;

/// Maximum length of a session name.
pub const MAX_SESSION_NAME_LEN: usize = 100;

/// A chat session owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub message_count: u32,
}

/// A single message within a chat session.
///
/// Messages are ordered by `created_at` within a session.
/// Assistant messages record the persona that produced them, along with
/// token usage and response timing metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub persona: Option<Persona>,
    pub created_at: DateTime<Utc>,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub model: Option<String>,
    pub response_ms: Option<u64>,
}

/// One user message paired with the reply it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub message: String,
    pub response: String,
}

/// Pair up consecutive user/assistant messages.
///
/// A trailing user message without a reply is dropped.
pub fn pair_exchanges(messages: &[ChatMessage]) -> Vec<Exchange> {
    let mut exchanges = Vec::new();
    let mut pending: Option<&str> = None;
    for msg in messages {
        match msg.role {
            MessageRole::User => pending = Some(&msg.content),
            MessageRole::Assistant => {
                if let Some(message) = pending.take() {
                    exchanges.push(Exchange {
                        message: message.to_string(),
                        response: msg.content.clone(),
                    });
                }
            }
            MessageRole::System => {}
        }
    }
    exchanges
}

/// Default name for a new session: `"{YYYY-MM-DD}_{HH-MM-SS} Chat"` in local time.
pub fn default_session_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{} Chat", now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Default name for a session created right now.
pub fn default_session_name_now() -> String {
    default_session_name(&Local::now())
}

/// Normalize and check a user-supplied session name.
pub fn validate_session_name(name: &str) -> Result<String, SessionError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SessionError::InvalidName("must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_SESSION_NAME_LEN {
        return Err(SessionError::InvalidName(format!(
            "must be at most {MAX_SESSION_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}
