//! In-memory fakes shared by the service tests.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures_util::Stream;
use uuid::Uuid;

use haven_types::chat::{ChatMessage, ChatSession};
use haven_types::error::RepositoryError;
use haven_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason,
    StreamEvent, Usage,
};
use haven_types::user::{AuthToken, User};

use crate::auth::hash::{ContentHasher, PasswordHasher, TokenGenerator};
use crate::llm::provider::LlmProvider;
use crate::repository::chat::ChatRepository;
use crate::repository::user::UserRepository;

pub fn test_user(username: &str) -> User {
    User {
        id: Uuid::now_v7(),
        username: username.to_string(),
        created_at: Utc::now(),
    }
}

// --- Users ---

#[derive(Default)]
struct UserState {
    users: Vec<(User, String)>,
    tokens: Vec<(AuthToken, String)>,
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    state: Arc<Mutex<UserState>>,
}

impl InMemoryUserRepository {
    pub fn password_hash(&self, username: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .users
            .iter()
            .find(|(u, _)| u.username == username)
            .map(|(_, h)| h.clone())
    }

    pub fn token_hashes(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.tokens.iter().map(|(_, h)| h.clone()).collect()
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, user: &User, password_hash: &str) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|(u, _)| u.username == user.username) {
            return Err(RepositoryError::Conflict(user.username.clone()));
        }
        state.users.push((user.clone(), password_hash.to_string()));
        Ok(())
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|(u, _)| u.username == username).cloned())
    }

    async fn get_user(&self, id: &Uuid) -> Result<Option<User>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .find(|(u, _)| u.id == *id)
            .map(|(u, _)| u.clone()))
    }

    async fn save_token(&self, token: &AuthToken, token_hash: &str) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.tokens.push((token.clone(), token_hash.to_string()));
        Ok(())
    }

    async fn find_user_by_token(&self, token_hash: &str) -> Result<Option<User>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let Some((token, _)) = state.tokens.iter().find(|(_, h)| h == token_hash) else {
            return Ok(None);
        };
        Ok(state
            .users
            .iter()
            .find(|(u, _)| u.id == token.user_id)
            .map(|(u, _)| u.clone()))
    }

    async fn delete_token(&self, token_hash: &str) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let before = state.tokens.len();
        state.tokens.retain(|(_, h)| h != token_hash);
        Ok(state.tokens.len() < before)
    }

    async fn delete_tokens_for_user(&self, user_id: &Uuid) -> Result<u64, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let before = state.tokens.len();
        state.tokens.retain(|(t, _)| t.user_id != *user_id);
        Ok((before - state.tokens.len()) as u64)
    }
}

/// Reversible stand-in for argon2; enough to tell hash from plaintext.
pub struct PlainPasswordHasher;

impl PasswordHasher for PlainPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, String> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        hash.strip_prefix("plain$") == Some(password)
    }
}

/// Counts `verify` calls, delegating to [`PlainPasswordHasher`].
#[derive(Clone, Default)]
pub struct CountingPasswordHasher {
    verify_calls: Arc<AtomicUsize>,
}

impl CountingPasswordHasher {
    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.verify_calls.store(0, Ordering::SeqCst);
    }
}

impl PasswordHasher for CountingPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, String> {
        PlainPasswordHasher.hash(password)
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        PlainPasswordHasher.verify(password, hash)
    }
}

pub struct ReverseHasher;

impl ContentHasher for ReverseHasher {
    fn compute_hash(&self, content: &str) -> String {
        content.chars().rev().collect()
    }
}

#[derive(Default)]
pub struct SequenceTokens {
    next: Mutex<u32>,
}

impl TokenGenerator for SequenceTokens {
    fn generate_token(&self) -> String {
        let mut next = self.next.lock().unwrap();
        *next += 1;
        format!("hvn_{:064x}", *next)
    }
}

// --- Chat ---

#[derive(Default)]
struct ChatState {
    sessions: Vec<ChatSession>,
    messages: Vec<ChatMessage>,
    injected_conflicts: u32,
}

impl ChatState {
    fn sorted_messages(&self, session_id: &Uuid) -> Vec<ChatMessage> {
        let mut out: Vec<ChatMessage> = self
            .messages
            .iter()
            .filter(|m| m.session_id == *session_id)
            .cloned()
            .collect();
        out.sort_by_key(|m| (m.created_at, m.id));
        out
    }

    fn push_message(&mut self, message: &ChatMessage) -> Result<(), RepositoryError> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == message.session_id)
            .ok_or(RepositoryError::NotFound)?;
        session.message_count += 1;
        self.messages.push(message.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryChatRepository {
    state: Arc<Mutex<ChatState>>,
}

impl InMemoryChatRepository {
    /// Make the next `n` `create_session` calls fail with a name conflict.
    pub fn fail_next_creates_with_conflict(&self, n: u32) {
        self.state.lock().unwrap().injected_conflicts = n;
    }
}

impl ChatRepository for InMemoryChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.injected_conflicts > 0 {
            state.injected_conflicts -= 1;
            return Err(RepositoryError::Conflict(session.name.clone()));
        }
        if state
            .sessions
            .iter()
            .any(|s| s.user_id == session.user_id && s.name == session.name)
        {
            return Err(RepositoryError::Conflict(session.name.clone()));
        }
        state.sessions.push(session.clone());
        Ok(session.clone())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.sessions.iter().find(|s| s.id == *session_id).cloned())
    }

    async fn list_sessions(&self, user_id: &Uuid) -> Result<Vec<ChatSession>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut out: Vec<ChatSession> = state
            .sessions
            .iter()
            .filter(|s| s.user_id == *user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(out)
    }

    async fn rename_session(&self, session_id: &Uuid, name: &str) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let owner = state
            .sessions
            .iter()
            .find(|s| s.id == *session_id)
            .map(|s| s.user_id)
            .ok_or(RepositoryError::NotFound)?;
        if state
            .sessions
            .iter()
            .any(|s| s.user_id == owner && s.name == name && s.id != *session_id)
        {
            return Err(RepositoryError::Conflict(name.to_string()));
        }
        if let Some(session) = state.sessions.iter_mut().find(|s| s.id == *session_id) {
            session.name = name.to_string();
        }
        Ok(())
    }

    async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let before = state.sessions.len();
        state.sessions.retain(|s| s.id != *session_id);
        if state.sessions.len() == before {
            return Err(RepositoryError::NotFound);
        }
        state.messages.retain(|m| m.session_id != *session_id);
        Ok(())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        self.state.lock().unwrap().push_message(message)
    }

    async fn save_exchange(
        &self,
        user_message: &ChatMessage,
        reply: &ChatMessage,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.push_message(user_message)?;
        state.push_message(reply)
    }

    async fn get_messages(
        &self,
        session_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let offset = offset.unwrap_or(0).max(0) as usize;
        let limit = limit.map_or(usize::MAX, |l| l.max(0) as usize);
        Ok(state
            .sorted_messages(session_id)
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn get_recent_messages(
        &self,
        session_id: &Uuid,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let all = state.sorted_messages(session_id);
        let skip = all.len().saturating_sub(limit as usize);
        Ok(all.into_iter().skip(skip).collect())
    }

    async fn list_user_messages(&self, user_id: &Uuid) -> Result<Vec<ChatMessage>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let owned: Vec<Uuid> = state
            .sessions
            .iter()
            .filter(|s| s.user_id == *user_id)
            .map(|s| s.id)
            .collect();
        let mut out: Vec<ChatMessage> = state
            .messages
            .iter()
            .filter(|m| owned.contains(&m.session_id))
            .cloned()
            .collect();
        out.sort_by_key(|m| (m.created_at, m.id));
        Ok(out)
    }

    async fn count_sessions(&self, user_id: &Uuid) -> Result<u64, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.sessions.iter().filter(|s| s.user_id == *user_id).count() as u64)
    }

    async fn count_messages(&self, user_id: &Uuid) -> Result<u64, RepositoryError> {
        Ok(self.list_user_messages(user_id).await?.len() as u64)
    }
}

// --- LLM ---

#[derive(Clone)]
enum MockReply {
    Text(String),
    Error,
}

/// Scripted provider. Replies are consumed in order; the last one repeats.
#[derive(Clone)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    capabilities: ProviderCapabilities,
}

impl MockProvider {
    fn with(reply: MockReply) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from([reply]))),
            requests: Arc::new(Mutex::new(Vec::new())),
            capabilities: ProviderCapabilities {
                streaming: true,
                structured_output: true,
                max_context_tokens: 32_000,
                max_output_tokens: 4_096,
            },
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::with(MockReply::Text(text.to_string()))
    }

    pub fn failing() -> Self {
        Self::with(MockReply::Error)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn next_reply(&self, request: &CompletionRequest) -> MockReply {
        self.requests.lock().unwrap().push(request.clone());
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().unwrap_or(MockReply::Error)
        } else {
            replies.front().cloned().unwrap_or(MockReply::Error)
        }
    }
}

fn mock_error() -> LlmError {
    LlmError::Provider {
        message: "mock provider failure".to_string(),
    }
}

impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        match self.next_reply(request) {
            MockReply::Text(content) => Ok(CompletionResponse {
                id: "resp-mock".to_string(),
                content,
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: Usage {
                    input_tokens: 10,
                    output_tokens: 20,
                },
            }),
            MockReply::Error => Err(mock_error()),
        }
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let reply = self.next_reply(&request);
        Box::pin(async_stream::stream! {
            yield Ok(StreamEvent::Connected);
            match reply {
                MockReply::Text(content) => {
                    let mid = content.chars().count() / 2;
                    let head: String = content.chars().take(mid).collect();
                    let tail: String = content.chars().skip(mid).collect();
                    yield Ok(StreamEvent::TextDelta { text: head });
                    yield Ok(StreamEvent::TextDelta { text: tail });
                    yield Ok(StreamEvent::MessageDelta { stop_reason: StopReason::EndTurn });
                    yield Ok(StreamEvent::Usage(Usage { input_tokens: 10, output_tokens: 20 }));
                    yield Ok(StreamEvent::Done);
                }
                MockReply::Error => {
                    yield Ok(StreamEvent::TextDelta { text: "partial".to_string() });
                    yield Err(mock_error());
                }
            }
        })
    }
}
