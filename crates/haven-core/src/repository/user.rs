//! User and auth token repository trait definition.

use haven_types::error::RepositoryError;
use haven_types::user::{AuthToken, User};
use uuid::Uuid;

/// Repository trait for accounts and login tokens.
///
/// Implementations live in haven-infra (e.g., `SqliteUserRepository`).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait UserRepository: Send + Sync {
    /// Insert a new user with its password hash.
    ///
    /// Returns `RepositoryError::Conflict` when the username is taken.
    fn create_user(
        &self,
        user: &User,
        password_hash: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Look up a user and the stored password hash by username.
    fn find_credentials(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<(User, String)>, RepositoryError>> + Send;

    /// Get a user by ID.
    fn get_user(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Persist a newly issued token. Only the hash is stored.
    fn save_token(
        &self,
        token: &AuthToken,
        token_hash: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Resolve a token hash to its owner, updating `last_used_at`.
    fn find_user_by_token(
        &self,
        token_hash: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Revoke one token. Returns whether a token was removed.
    fn delete_token(
        &self,
        token_hash: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Revoke every token of a user. Returns the number removed.
    fn delete_tokens_for_user(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
