//! Business logic and repository trait definitions for Haven.
//!
//! This crate defines the "ports" (repository, hashing and LLM provider
//! traits) that the infrastructure layer implements, plus the services that
//! orchestrate them. It depends only on `haven-types` and `haven-observe`,
//! never on `haven-infra` or any database/IO crate.

pub mod analytics;
pub mod auth;
pub mod chat;
pub mod llm;
pub mod persona;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;
