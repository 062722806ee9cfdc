//! Chat sessions and companion replies.
//!
//! `ChatService` owns the session lifecycle for a user and turns a user
//! message into a persona-framed LLM request, persisting the exchange once
//! the reply is complete.

pub mod service;
mod span_stream;

pub use service::{ChatEventStream, ChatService, ChatSettings, ChatStreamEvent};
