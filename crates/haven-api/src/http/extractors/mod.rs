//! Request extractors: bearer token authentication and query parameters.

pub mod auth;
pub mod query;
