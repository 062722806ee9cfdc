//! SQLite user and token repository implementation.

use chrono::{TimeDelta, Utc};
use sqlx::Row;
use uuid::Uuid;

use haven_core::repository::user::UserRepository;
use haven_types::error::RepositoryError;
use haven_types::user::{AuthToken, User};

use super::pool::DatabasePool;
use super::{format_datetime, is_unique_violation, parse_datetime, parse_uuid};

/// Minimum age in seconds before a lookup rewrites `last_used_at`.
const LAST_USED_RESOLUTION_SECS: i64 = 60;

/// SQLite-backed implementation of `UserRepository`.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct UserRow {
    id: String,
    username: String,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        Ok(User {
            id: parse_uuid(&self.id, "user id")?,
            username: self.username,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, RepositoryError> {
    UserRow::from_row(row)
        .map_err(|e| RepositoryError::Query(e.to_string()))?
        .into_user()
}

impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, user: &User, password_hash: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(password_hash)
        .bind(format_datetime(&user.created_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(RepositoryError::Conflict(format!(
                "username '{}' already exists",
                user.username
            ))),
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query("SELECT id, username, created_at, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let hash: String = row
                    .try_get("password_hash")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some((user_from_row(&row)?, hash)))
            }
            None => Ok(None),
        }
    }

    async fn get_user(&self, id: &Uuid) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT id, username, created_at FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn save_token(&self, token: &AuthToken, token_hash: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO auth_tokens (id, user_id, token_hash, created_at, last_used_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(token.id.to_string())
        .bind(token.user_id.to_string())
        .bind(token_hash)
        .bind(format_datetime(&token.created_at))
        .bind(token.last_used_at.as_ref().map(format_datetime))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn find_user_by_token(&self, token_hash: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            "SELECT u.id, u.username, u.created_at, t.last_used_at
             FROM auth_tokens t JOIN users u ON u.id = t.user_id
             WHERE t.token_hash = ?",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let user = user_from_row(&row)?;
        let last_used_at: Option<String> = row
            .try_get("last_used_at")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let now = Utc::now();
        let stale = match last_used_at.as_deref().map(parse_datetime).transpose()? {
            Some(last) => now - last >= TimeDelta::seconds(LAST_USED_RESOLUTION_SECS),
            None => true,
        };
        if stale {
            sqlx::query("UPDATE auth_tokens SET last_used_at = ? WHERE token_hash = ?")
                .bind(format_datetime(&now))
                .bind(token_hash)
                .execute(&self.pool.writer)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
        }

        Ok(Some(user))
    }

    async fn delete_token(&self, token_hash: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_tokens_for_user(&self, user_id: &Uuid) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
