//! User account and authentication token types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum accepted username length.
pub const MAX_USERNAME_LEN: usize = 32;

/// A registered account.
///
/// The password hash is deliberately not part of this type; it only travels
/// between the auth service and the user repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A login token record. Only the SHA-256 hash of the bearer value is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Check a username: 3-32 chars of ASCII letters, digits, `_`, `-` or `.`.
pub fn validate_username(username: &str) -> Result<(), AuthError> {
    let len = username.chars().count();
    if len < 3 {
        return Err(AuthError::InvalidUsername(
            "must be at least 3 characters".to_string(),
        ));
    }
    if len > MAX_USERNAME_LEN {
        return Err(AuthError::InvalidUsername(format!(
            "must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    if let Some(c) = username
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(AuthError::InvalidUsername(format!(
            "character '{c}' is not allowed"
        )));
    }
    Ok(())
}

/// Check a password against the minimum length.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::InvalidPassword(format!(
            "must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
