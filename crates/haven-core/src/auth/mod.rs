//! Account registration, login and bearer-token authentication.

pub mod hash;
pub mod service;

pub use hash::{ContentHasher, PasswordHasher, TokenGenerator};
pub use service::AuthService;
