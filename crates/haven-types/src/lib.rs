//! Shared domain types for Haven.
//!
//! This crate contains the core domain types used across the Haven companion:
//! users, chat sessions and messages, personas, LLM request shapes, analytics
//! assessments, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror, schemars.

pub mod analytics;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod persona;
pub mod user;
