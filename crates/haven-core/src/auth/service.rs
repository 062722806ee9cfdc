//! Authentication service.
//!
//! Passwords are stored only as salted hashes. Logins issue opaque bearer
//! tokens: the plaintext is returned to the caller once and only its digest
//! is persisted, so a leaked database does not leak usable tokens.

use std::sync::OnceLock;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use haven_types::error::{AuthError, RepositoryError};
use haven_types::user::{AuthToken, User, validate_password, validate_username};

use crate::auth::hash::{ContentHasher, PasswordHasher, TokenGenerator};
use crate::repository::user::UserRepository;

/// Service for accounts and login tokens.
///
/// Generic over the repository and hashing ports so haven-core never
/// depends on haven-infra.
pub struct AuthService<U, P, H, G>
where
    U: UserRepository,
    P: PasswordHasher,
    H: ContentHasher,
    G: TokenGenerator,
{
    user_repo: U,
    password_hasher: P,
    token_hasher: H,
    token_generator: G,
    /// Hash checked for unknown usernames so both rejection paths cost the same.
    dummy_hash: OnceLock<String>,
}

impl<U, P, H, G> AuthService<U, P, H, G>
where
    U: UserRepository,
    P: PasswordHasher,
    H: ContentHasher,
    G: TokenGenerator,
{
    pub fn new(user_repo: U, password_hasher: P, token_hasher: H, token_generator: G) -> Self {
        Self {
            user_repo,
            password_hasher,
            token_hasher,
            token_generator,
            dummy_hash: OnceLock::new(),
        }
    }

    fn dummy_hash(&self) -> &str {
        self.dummy_hash.get_or_init(|| {
            self.password_hasher
                .hash("haven-unknown-user")
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Failed to prepare dummy password hash");
                    String::new()
                })
        })
    }

    /// Create an account.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = username.trim();
        validate_username(username)?;
        validate_password(password)?;

        let password_hash = self.password_hasher.hash(password).map_err(|e| {
            warn!(error = %e, "Password hashing failed");
            AuthError::Hashing
        })?;

        let user = User {
            id: Uuid::now_v7(),
            username: username.to_string(),
            created_at: Utc::now(),
        };

        match self.user_repo.create_user(&user, &password_hash).await {
            Ok(()) => {
                info!(user_id = %user.id, username = %user.username, "User registered");
                Ok(user)
            }
            Err(RepositoryError::Conflict(_)) => Err(AuthError::UsernameTaken(user.username)),
            Err(e) => Err(AuthError::Storage(e.to_string())),
        }
    }

    /// Check a username/password pair without issuing a token.
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let found = self
            .user_repo
            .find_credentials(username.trim())
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        match found {
            Some((user, hash)) if self.password_hasher.verify(password, &hash) => Ok(user),
            Some((user, _)) => {
                debug!(user_id = %user.id, "Login rejected: wrong password");
                Err(AuthError::InvalidCredentials)
            }
            None => {
                let _ = self.password_hasher.verify(password, self.dummy_hash());
                debug!("Login rejected: unknown username");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Verify credentials and issue a new bearer token.
    ///
    /// Returns the user and the plaintext token, which is not recoverable
    /// afterwards.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String), AuthError> {
        let user = self.verify_credentials(username, password).await?;

        let token = self.token_generator.generate_token();
        let record = AuthToken {
            id: Uuid::now_v7(),
            user_id: user.id,
            created_at: Utc::now(),
            last_used_at: None,
        };
        self.user_repo
            .save_token(&record, &self.token_hasher.compute_hash(&token))
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        info!(user_id = %user.id, token_id = %record.id, "User logged in");
        Ok((user, token))
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        self.user_repo
            .find_user_by_token(&self.token_hasher.compute_hash(token))
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?
            .ok_or(AuthError::InvalidToken)
    }

    /// Revoke a single token.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let removed = self
            .user_repo
            .delete_token(&self.token_hasher.compute_hash(token.trim()))
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        if removed {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }

    /// Revoke every token of a user. Returns how many were revoked.
    pub async fn logout_all(&self, user_id: &Uuid) -> Result<u64, AuthError> {
        let count = self
            .user_repo
            .delete_tokens_for_user(user_id)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        info!(user_id = %user_id, count, "Revoked all tokens");
        Ok(count)
    }

    pub async fn get_user(&self, user_id: &Uuid) -> Result<Option<User>, AuthError> {
        self.user_repo
            .get_user(user_id)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))
    }
}
