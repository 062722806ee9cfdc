//! SQLite chat repository implementation.
//!
//! Raw queries with private row structs, reads on the reader pool and writes
//! on the writer pool.

use sqlx::Row;
use uuid::Uuid;

use haven_core::repository::chat::ChatRepository;
use haven_types::chat::{ChatMessage, ChatSession, MessageRole};
use haven_types::error::RepositoryError;
use haven_types::persona::Persona;

use super::pool::DatabasePool;
use super::{format_datetime, is_unique_violation, parse_datetime, parse_uuid};

/// SQLite-backed implementation of `ChatRepository`.
#[derive(Clone)]
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

struct ChatSessionRow {
    id: String,
    user_id: String,
    name: String,
    created_at: String,
    message_count: i64,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
            message_count: row.try_get("message_count")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        Ok(ChatSession {
            id: parse_uuid(&self.id, "session id")?,
            user_id: parse_uuid(&self.user_id, "user_id")?,
            name: self.name,
            created_at: parse_datetime(&self.created_at)?,
            message_count: self.message_count as u32,
        })
    }
}

struct ChatMessageRow {
    id: String,
    session_id: String,
    role: String,
    content: String,
    persona: Option<String>,
    created_at: String,
    input_tokens: Option<i64>,
    output_tokens: Option<i64>,
    model: Option<String>,
    response_ms: Option<i64>,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            persona: row.try_get("persona")?,
            created_at: row.try_get("created_at")?,
            input_tokens: row.try_get("input_tokens")?,
            output_tokens: row.try_get("output_tokens")?,
            model: row.try_get("model")?,
            response_ms: row.try_get("response_ms")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let role: MessageRole = self.role.parse().map_err(RepositoryError::Query)?;
        let persona: Option<Persona> = self
            .persona
            .as_deref()
            .map(str::parse::<Persona>)
            .transpose()
            .map_err(RepositoryError::Query)?;

        Ok(ChatMessage {
            id: parse_uuid(&self.id, "message id")?,
            session_id: parse_uuid(&self.session_id, "session_id")?,
            role,
            content: self.content,
            persona,
            created_at: parse_datetime(&self.created_at)?,
            input_tokens: self.input_tokens.map(|v| v as u32),
            output_tokens: self.output_tokens.map(|v| v as u32),
            model: self.model,
            response_ms: self.response_ms.map(|v| v as u64),
        })
    }
}

fn sessions_from_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<ChatSession>, RepositoryError> {
    rows.iter()
        .map(|row| {
            ChatSessionRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_session()
        })
        .collect()
}

fn messages_from_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<ChatMessage>, RepositoryError> {
    rows.iter()
        .map(|row| {
            ChatMessageRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_message()
        })
        .collect()
}

async fn insert_message<'e, E>(executor: E, message: &ChatMessage) -> Result<(), RepositoryError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"INSERT INTO chat_messages (id, session_id, role, content, persona, created_at, input_tokens, output_tokens, model, response_ms)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(message.id.to_string())
    .bind(message.session_id.to_string())
    .bind(message.role.to_string())
    .bind(&message.content)
    .bind(message.persona.map(|p| p.slug()))
    .bind(format_datetime(&message.created_at))
    .bind(message.input_tokens.map(|v| v as i64))
    .bind(message.output_tokens.map(|v| v as i64))
    .bind(&message.model)
    .bind(message.response_ms.map(|v| v as i64))
    .execute(executor)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.message().contains("FOREIGN KEY") => {
            RepositoryError::NotFound
        }
        other => RepositoryError::Query(other.to_string()),
    })?;
    Ok(())
}

async fn bump_message_count<'e, E>(executor: E, session_id: &Uuid, by: i64) -> Result<(), RepositoryError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query("UPDATE chat_sessions SET message_count = message_count + ? WHERE id = ?")
        .bind(by)
        .bind(session_id.to_string())
        .execute(executor)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    Ok(())
}

/// LIMIT/OFFSET suffix. SQLite needs a LIMIT before an OFFSET; -1 means none.
fn page_clause(limit: Option<i64>, offset: Option<i64>) -> String {
    match (limit, offset) {
        (None, None) => String::new(),
        (limit, offset) => format!(
            " LIMIT {} OFFSET {}",
            limit.unwrap_or(-1),
            offset.unwrap_or(0).max(0)
        ),
    }
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO chat_sessions (id, user_id, name, created_at, message_count)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(session.id.to_string())
        .bind(session.user_id.to_string())
        .bind(&session.name)
        .bind(format_datetime(&session.created_at))
        .bind(session.message_count as i64)
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(session.clone()),
            Err(e) if is_unique_violation(&e) => Err(RepositoryError::Conflict(session.name.clone())),
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => Ok(sessions_from_rows(std::slice::from_ref(&row))?.pop()),
            None => Ok(None),
        }
    }

    async fn list_sessions(&self, user_id: &Uuid) -> Result<Vec<ChatSession>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM chat_sessions WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sessions_from_rows(&rows)
    }

    async fn rename_session(&self, session_id: &Uuid, name: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE chat_sessions SET name = ? WHERE id = ?")
            .bind(name)
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await;

        match result {
            Ok(r) if r.rows_affected() == 0 => Err(RepositoryError::NotFound),
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(RepositoryError::Conflict(name.to_string())),
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        // Messages go with the session through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        insert_message(&mut *tx, message).await?;
        bump_message_count(&mut *tx, &message.session_id, 1).await?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))
    }

    async fn save_exchange(
        &self,
        user_message: &ChatMessage,
        reply: &ChatMessage,
    ) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        insert_message(&mut *tx, user_message).await?;
        insert_message(&mut *tx, reply).await?;
        bump_message_count(&mut *tx, &user_message.session_id, 2).await?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))
    }

    async fn get_messages(
        &self,
        session_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let sql = format!(
            "SELECT * FROM chat_messages WHERE session_id = ? ORDER BY created_at ASC, id ASC{}",
            page_clause(limit, offset)
        );

        let rows = sqlx::query(&sql)
            .bind(session_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        messages_from_rows(&rows)
    }

    async fn get_recent_messages(
        &self,
        session_id: &Uuid,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM (
                 SELECT * FROM chat_messages WHERE session_id = ?
                 ORDER BY created_at DESC, id DESC LIMIT ?
             ) ORDER BY created_at ASC, id ASC",
        )
        .bind(session_id.to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        messages_from_rows(&rows)
    }

    async fn list_user_messages(&self, user_id: &Uuid) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT m.* FROM chat_messages m
             JOIN chat_sessions s ON s.id = m.session_id
             WHERE s.user_id = ?
             ORDER BY m.created_at ASC, m.id ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        messages_from_rows(&rows)
    }

    async fn count_sessions(&self, user_id: &Uuid) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_sessions WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(count as u64)
    }

    async fn count_messages(&self, user_id: &Uuid) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM chat_messages m
             JOIN chat_sessions s ON s.id = m.session_id
             WHERE s.user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(count as u64)
    }
}
