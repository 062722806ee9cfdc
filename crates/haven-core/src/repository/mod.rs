//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (haven-infra) implements. The core crate never depends on any specific
//! storage technology.

pub mod chat;
pub mod user;
