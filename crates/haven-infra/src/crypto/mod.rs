//! Cryptographic adapters for the auth ports in `haven-core`.
//!
//! - `hash`: SHA-256 digests of bearer tokens
//! - `password`: argon2id password hashing
//! - `token`: random bearer token generation

pub mod hash;
pub mod password;
pub mod token;
