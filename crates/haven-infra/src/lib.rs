//! Infrastructure layer for Haven.
//!
//! Contains implementations of the traits defined in `haven-core`: SQLite
//! storage, password and token hashing, the OpenAI-compatible LLM provider,
//! and config/data-directory loading.

pub mod config;
pub mod crypto;
pub mod filesystem;
pub mod llm;
pub mod sqlite;
