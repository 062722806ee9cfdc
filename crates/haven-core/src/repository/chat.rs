//! ChatRepository trait definition.
//!
//! Provides CRUD operations for chat sessions and their messages.
//! Follows the same RPITIT pattern as `UserRepository`.

use haven_types::chat::{ChatMessage, ChatSession};
use haven_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for chat session and message persistence.
///
/// Ownership checks are not done here; `ChatService` compares
/// `ChatSession::user_id` before calling any session-scoped method.
pub trait ChatRepository: Send + Sync {
    /// Create a new chat session.
    ///
    /// Returns `RepositoryError::Conflict` when the user already has a
    /// session with the same name.
    fn create_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Get a chat session by its unique ID.
    fn get_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// List a user's sessions, newest first.
    fn list_sessions(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send;

    /// Rename a session. `NotFound` if it does not exist, `Conflict` if the
    /// owner already uses the name.
    fn rename_session(
        &self,
        session_id: &Uuid,
        name: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a chat session and its messages.
    fn delete_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Save a single message, incrementing the session's message_count.
    fn save_message(
        &self,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Save a user message and its reply atomically.
    fn save_exchange(
        &self,
        user_message: &ChatMessage,
        reply: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get messages for a session, ordered by created_at ASC.
    fn get_messages(
        &self,
        session_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Get the last `limit` messages of a session, still ordered oldest first.
    fn get_recent_messages(
        &self,
        session_id: &Uuid,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// All of a user's messages across sessions, in chronological order.
    fn list_user_messages(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Count a user's sessions.
    fn count_sessions(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Count a user's messages across all sessions.
    fn count_messages(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
