//! HTTP request handlers for the REST API.

pub mod analytics;
pub mod auth;
pub mod chat;
pub mod persona;
pub mod session;
