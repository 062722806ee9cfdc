//! Chat service orchestrating session lifecycle and companion replies.
//!
//! Every session-scoped operation takes the acting `User` and checks that
//! the session belongs to them; a session owned by someone else is reported
//! as not found.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use haven_types::chat::{
    ChatMessage, ChatSession, Exchange, MessageRole, default_session_name_now, pair_exchanges,
    validate_session_name,
};
use haven_types::config::ChatConfig;
use haven_types::error::{ChatError, RepositoryError, SessionError};
use haven_types::llm::{CompletionRequest, CompletionResponse, Message, StreamEvent, Usage};
use haven_types::persona::Persona;
use haven_types::user::User;

use crate::chat::span_stream::StreamInSpan;
use crate::llm::box_provider::BoxLlmProvider;
use crate::persona::build_system_prompt;
use crate::repository::chat::ChatRepository;

/// Attempts at finding a free default name before giving up.
const MAX_NAME_ATTEMPTS: u32 = 10;

/// Model parameters for companion replies.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Maximum number of prior messages included in a request.
    pub history_window: u32,
}

impl From<&ChatConfig> for ChatSettings {
    fn from(config: &ChatConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            history_window: config.history_window,
        }
    }
}

/// Events produced while a reply is streamed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatStreamEvent {
    /// A fragment of the reply text.
    TextDelta { text: String },
    /// The persisted reply. Always the last event of a successful stream.
    Message { message: ChatMessage },
}

pub type ChatEventStream =
    Pin<Box<dyn Stream<Item = Result<ChatStreamEvent, ChatError>> + Send + 'static>>;

/// A request ready to send, plus the user message to persist with the reply.
struct PreparedTurn {
    request: CompletionRequest,
    user_message: ChatMessage,
    persona: Persona,
}

/// Orchestrates chat sessions and message exchange for a user.
///
/// Generic over `ChatRepository` to maintain clean architecture
/// (haven-core never depends on haven-infra).
pub struct ChatService<C: ChatRepository> {
    chat_repo: Arc<C>,
    provider: Arc<BoxLlmProvider>,
    settings: ChatSettings,
}

impl<C: ChatRepository + 'static> ChatService<C> {
    pub fn new(chat_repo: C, provider: BoxLlmProvider, settings: ChatSettings) -> Self {
        Self {
            chat_repo: Arc::new(chat_repo),
            provider: Arc::new(provider),
            settings,
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    // --- Session lifecycle ---

    /// Create a session for `user`.
    ///
    /// Without a name the session is named after the current local time;
    /// if that name is already used (two sessions in the same second) a
    /// ` (2)`, ` (3)`, ... suffix is appended. An explicit name is used as
    /// given and a clash is reported as `NameConflict`.
    pub async fn create_session(
        &self,
        user: &User,
        name: Option<&str>,
    ) -> Result<ChatSession, SessionError> {
        if let Some(name) = name {
            let name = validate_session_name(name)?;
            let session = self.chat_repo.create_session(&new_session(user, name)).await?;
            info!(user_id = %user.id, session_id = %session.id, "Session created");
            return Ok(session);
        }

        let base = default_session_name_now();
        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let name = if attempt == 1 {
                base.clone()
            } else {
                format!("{base} ({attempt})")
            };
            match self.chat_repo.create_session(&new_session(user, name)).await {
                Ok(session) => {
                    info!(user_id = %user.id, session_id = %session.id, name = %session.name, "Session created");
                    return Ok(session);
                }
                Err(RepositoryError::Conflict(_)) => {
                    debug!(attempt, "Default session name taken, retrying with suffix");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(SessionError::NameConflict(base))
    }

    /// List the user's sessions, newest first.
    pub async fn list_sessions(&self, user: &User) -> Result<Vec<ChatSession>, SessionError> {
        Ok(self.chat_repo.list_sessions(&user.id).await?)
    }

    /// Get a session the user owns.
    pub async fn get_session(&self, user: &User, session_id: &Uuid) -> Result<ChatSession, SessionError> {
        match self.chat_repo.get_session(session_id).await? {
            Some(session) if session.user_id == user.id => Ok(session),
            Some(_) => {
                warn!(user_id = %user.id, session_id = %session_id, "Access to another user's session refused");
                Err(SessionError::NotFound)
            }
            None => Err(SessionError::NotFound),
        }
    }

    /// Rename a session. Returns the updated session.
    pub async fn rename_session(
        &self,
        user: &User,
        session_id: &Uuid,
        name: &str,
    ) -> Result<ChatSession, SessionError> {
        let name = validate_session_name(name)?;
        let mut session = self.get_session(user, session_id).await?;
        self.chat_repo.rename_session(session_id, &name).await?;
        info!(session_id = %session_id, "Session renamed");
        session.name = name;
        Ok(session)
    }

    /// Delete a session and all of its messages.
    pub async fn delete_session(&self, user: &User, session_id: &Uuid) -> Result<(), SessionError> {
        self.get_session(user, session_id).await?;
        self.chat_repo.delete_session(session_id).await?;
        info!(session_id = %session_id, "Session deleted");
        Ok(())
    }

    // --- History ---

    /// Messages of a session, oldest first, optionally paginated.
    pub async fn load_messages(
        &self,
        user: &User,
        session_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatMessage>, SessionError> {
        self.get_session(user, session_id).await?;
        Ok(self.chat_repo.get_messages(session_id, limit, offset).await?)
    }

    /// Full message history of a session, oldest first.
    pub async fn load_history(&self, user: &User, session_id: &Uuid) -> Result<Vec<ChatMessage>, SessionError> {
        self.load_messages(user, session_id, None, None).await
    }

    /// History of a session as user/reply pairs.
    pub async fn load_exchanges(&self, user: &User, session_id: &Uuid) -> Result<Vec<Exchange>, SessionError> {
        Ok(pair_exchanges(&self.load_history(user, session_id).await?))
    }

    /// All of the user's messages across sessions, chronological.
    pub async fn load_all_messages(&self, user: &User) -> Result<Vec<ChatMessage>, SessionError> {
        Ok(self.chat_repo.list_user_messages(&user.id).await?)
    }

    /// Session and message totals for the user.
    pub async fn stats(&self, user: &User) -> Result<(u64, u64), SessionError> {
        let sessions = self.chat_repo.count_sessions(&user.id).await?;
        let messages = self.chat_repo.count_messages(&user.id).await?;
        Ok((sessions, messages))
    }

    // --- Messaging ---

    /// Validate input, check ownership and assemble the provider request.
    async fn prepare_turn(
        &self,
        user: &User,
        session_id: &Uuid,
        input: &str,
        persona: Persona,
        stream: bool,
    ) -> Result<PreparedTurn, ChatError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        self.get_session(user, session_id).await?;

        let prior = self
            .chat_repo
            .get_recent_messages(session_id, self.settings.history_window)
            .await?;
        let history: Vec<Message> = prior
            .iter()
            .map(|m| Message {
                role: m.role,
                content: m.content.clone(),
            })
            .collect();

        let system = build_system_prompt(persona, &history);
        let mut messages = history;
        messages.push(Message::user(input));

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages,
            system: Some(system),
            max_tokens: self.settings.max_tokens,
            temperature: Some(self.settings.temperature),
            stream,
            response_schema: None,
        };

        let user_message = ChatMessage {
            id: Uuid::now_v7(),
            session_id: *session_id,
            role: MessageRole::User,
            content: input.to_string(),
            persona: None,
            created_at: Utc::now(),
            input_tokens: None,
            output_tokens: None,
            model: None,
            response_ms: None,
        };

        Ok(PreparedTurn {
            request,
            user_message,
            persona,
        })
    }

    fn llm_span(&self, request: &CompletionRequest, persona: Persona, session_id: &Uuid) -> tracing::Span {
        info_span!(
            "chat",
            gen_ai.operation.name = haven_observe::genai_attrs::OP_CHAT,
            gen_ai.provider.name = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            haven.persona = persona.slug(),
            haven.session.id = %session_id,
        )
    }

    /// Send a message and wait for the full reply.
    ///
    /// The user message and the reply are persisted together after the
    /// provider answers. If the provider fails nothing is stored.
    pub async fn send_message(
        &self,
        user: &User,
        session_id: &Uuid,
        input: &str,
        persona: Persona,
    ) -> Result<ChatMessage, ChatError> {
        let turn = self.prepare_turn(user, session_id, input, persona, false).await?;
        let span = self.llm_span(&turn.request, persona, session_id);

        let started = Instant::now();
        let response = match self.provider.complete(&turn.request).instrument(span).await {
            Ok(response) => response,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Provider call failed; nothing persisted");
                return Err(e.into());
            }
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let reply = reply_from_response(&turn, response, elapsed_ms);
        self.chat_repo
            .save_exchange(&turn.user_message, &reply)
            .await?;

        info!(
            session_id = %session_id,
            persona = persona.slug(),
            response_ms = elapsed_ms,
            "Reply generated"
        );
        Ok(reply)
    }

    /// Send a message and stream the reply.
    ///
    /// Validation and ownership errors are returned before any streaming
    /// starts. The exchange is persisted when the provider stream finishes
    /// cleanly, and the stored reply is emitted as the final event. A stream
    /// that errors or is dropped early persists nothing.
    pub async fn stream_message(
        &self,
        user: &User,
        session_id: &Uuid,
        input: &str,
        persona: Persona,
    ) -> Result<ChatEventStream, ChatError> {
        let turn = self.prepare_turn(user, session_id, input, persona, true).await?;
        let span = self.llm_span(&turn.request, persona, session_id);
        let upstream = StreamInSpan::new(self.provider.stream(turn.request.clone()), span);

        Ok(Box::pin(relay_stream(
            Arc::clone(&self.chat_repo),
            turn,
            upstream,
        )))
    }
}

fn new_session(user: &User, name: String) -> ChatSession {
    ChatSession {
        id: Uuid::now_v7(),
        user_id: user.id,
        name,
        created_at: Utc::now(),
        message_count: 0,
    }
}

fn reply_from_response(turn: &PreparedTurn, response: CompletionResponse, elapsed_ms: u64) -> ChatMessage {
    let model = if response.model.is_empty() {
        turn.request.model.clone()
    } else {
        response.model
    };
    build_reply(turn, response.content, model, &response.usage, elapsed_ms)
}

fn build_reply(
    turn: &PreparedTurn,
    content: String,
    model: String,
    usage: &Usage,
    elapsed_ms: u64,
) -> ChatMessage {
    ChatMessage {
        id: Uuid::now_v7(),
        session_id: turn.user_message.session_id,
        role: MessageRole::Assistant,
        content,
        persona: Some(turn.persona),
        created_at: Utc::now(),
        input_tokens: Some(usage.input_tokens),
        output_tokens: Some(usage.output_tokens),
        model: Some(model),
        response_ms: Some(elapsed_ms),
    }
}

/// Forward text deltas, then persist the exchange and emit the stored reply.
fn relay_stream<C: ChatRepository + 'static>(
    chat_repo: Arc<C>,
    turn: PreparedTurn,
    mut upstream: StreamInSpan,
) -> impl Stream<Item = Result<ChatStreamEvent, ChatError>> + Send + 'static {
    async_stream::try_stream! {
        let started = Instant::now();
        let mut content = String::new();
        let mut usage = Usage::default();

        while let Some(event) = upstream.next().await {
            match event? {
                StreamEvent::TextDelta { text } => {
                    content.push_str(&text);
                    yield ChatStreamEvent::TextDelta { text };
                }
                StreamEvent::Usage(u) => usage = u,
                StreamEvent::Done => break,
                StreamEvent::Connected | StreamEvent::MessageDelta { .. } => {}
            }
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let reply = build_reply(&turn, content, turn.request.model.clone(), &usage, elapsed_ms);
        chat_repo.save_exchange(&turn.user_message, &reply).await?;
        info!(
            session_id = %reply.session_id,
            persona = turn.persona.slug(),
            response_ms = elapsed_ms,
            "Streamed reply persisted"
        );

        yield ChatStreamEvent::Message { message: reply };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryChatRepository, MockProvider, test_user};

    fn settings() -> ChatSettings {
        ChatSettings {
            model: "test-model".to_string(),
            max_tokens: 256,
            temperature: 0.7,
            history_window: 4,
        }
    }

    fn service(provider: MockProvider) -> (ChatService<InMemoryChatRepository>, InMemoryChatRepository, MockProvider) {
        let repo = InMemoryChatRepository::default();
        let svc = ChatService::new(repo.clone(), BoxLlmProvider::new(provider.clone()), settings());
        (svc, repo, provider)
    }

    #[tokio::test]
    async fn default_session_name_matches_pattern() {
        let (chat, _, _) = service(MockProvider::replying("ok"));
        let user = test_user("mira");
        let session = chat.create_session(&user, None).await.unwrap();

        let name = session.name.as_str();
        assert!(name.ends_with(" Chat"));
        let stamp = name.trim_end_matches(" Chat");
        assert_eq!(stamp.len(), 19);
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d_%H-%M-%S").is_ok());
    }

    #[tokio::test]
    async fn name_collision_gets_suffix() {
        let (chat, repo, _) = service(MockProvider::replying("ok"));
        let user = test_user("mira");
        repo.fail_next_creates_with_conflict(2);

        let session = chat.create_session(&user, None).await.unwrap();
        assert!(session.name.ends_with(" Chat (3)"), "{}", session.name);
    }

    #[tokio::test]
    async fn explicit_name_conflict_is_reported() {
        let (chat, _, _) = service(MockProvider::replying("ok"));
        let user = test_user("mira");
        chat.create_session(&user, Some("Exam nerves")).await.unwrap();
        let err = chat.create_session(&user, Some("Exam nerves")).await.unwrap_err();
        assert!(matches!(err, SessionError::NameConflict(_)));
    }

    #[tokio::test]
    async fn other_users_sessions_are_invisible() {
        let (chat, _, _) = service(MockProvider::replying("ok"));
        let owner = test_user("mira");
        let intruder = test_user("nosy");
        let session = chat.create_session(&owner, None).await.unwrap();

        assert!(matches!(
            chat.get_session(&intruder, &session.id).await,
            Err(SessionError::NotFound)
        ));
        assert!(matches!(
            chat.rename_session(&intruder, &session.id, "mine now").await,
            Err(SessionError::NotFound)
        ));
        assert!(matches!(
            chat.delete_session(&intruder, &session.id).await,
            Err(SessionError::NotFound)
        ));
        assert!(matches!(
            chat.send_message(&intruder, &session.id, "hi", Persona::Counselor).await,
            Err(ChatError::Session(SessionError::NotFound))
        ));
        assert!(chat.list_sessions(&intruder).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rename_and_delete() {
        let (chat, _, _) = service(MockProvider::replying("ok"));
        let user = test_user("mira");
        let session = chat.create_session(&user, None).await.unwrap();

        let renamed = chat.rename_session(&user, &session.id, "  Sunday  ").await.unwrap();
        assert_eq!(renamed.name, "Sunday");
        assert!(matches!(
            chat.rename_session(&user, &session.id, "   ").await,
            Err(SessionError::InvalidName(_))
        ));

        chat.send_message(&user, &session.id, "hello", Persona::Counselor).await.unwrap();
        chat.delete_session(&user, &session.id).await.unwrap();
        assert!(matches!(
            chat.get_session(&user, &session.id).await,
            Err(SessionError::NotFound)
        ));
        assert!(chat.load_all_messages(&user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_message_persists_exchange() {
        let (chat, _, provider) = service(MockProvider::replying("I'm here for you."));
        let user = test_user("mira");
        let session = chat.create_session(&user, None).await.unwrap();

        let reply = chat
            .send_message(&user, &session.id, "  I feel anxious  ", Persona::CompassionateListener)
            .await
            .unwrap();
        assert_eq!(reply.role, MessageRole::Assistant);
        assert_eq!(reply.content, "I'm here for you.");
        assert_eq!(reply.persona, Some(Persona::CompassionateListener));
        assert_eq!(reply.output_tokens, Some(20));

        let history = chat.load_history(&user, &session.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "I feel anxious");
        assert_eq!(history[0].role, MessageRole::User);

        let exchanges = chat.load_exchanges(&user, &session.id).await.unwrap();
        assert_eq!(exchanges.len(), 1);
        assert_eq!(exchanges[0].response, "I'm here for you.");

        let request = provider.last_request().unwrap();
        assert_eq!(request.model, "test-model");
        assert_eq!(request.max_tokens, 256);
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.messages.len(), 1);
        assert!(request.system.unwrap().starts_with("You are the Compassionate Listener"));
    }

    #[tokio::test]
    async fn request_carries_windowed_history() {
        let (chat, _, provider) = service(MockProvider::replying("reply"));
        let user = test_user("mira");
        let session = chat.create_session(&user, None).await.unwrap();

        for i in 0..4 {
            chat.send_message(&user, &session.id, &format!("message {i}"), Persona::Counselor)
                .await
                .unwrap();
        }

        // Six prior messages, window of four, plus the new input.
        let request = provider.last_request().unwrap();
        assert_eq!(request.messages.len(), 5);
        assert_eq!(request.messages[0].content, "message 1");
        assert_eq!(request.messages[4].content, "message 3");
        let system = request.system.unwrap();
        assert!(system.contains("User: message 1"));
        assert!(system.contains("Heavenly DelusionZ Counselor: reply"));
        assert!(!system.contains("message 0"));
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let (chat, _, provider) = service(MockProvider::replying("ok"));
        let user = test_user("mira");
        let session = chat.create_session(&user, None).await.unwrap();

        assert!(matches!(
            chat.send_message(&user, &session.id, "  \n ", Persona::Counselor).await,
            Err(ChatError::EmptyMessage)
        ));
        assert!(provider.last_request().is_none());
    }

    #[tokio::test]
    async fn provider_failure_persists_nothing() {
        let (chat, _, _) = service(MockProvider::failing());
        let user = test_user("mira");
        let session = chat.create_session(&user, None).await.unwrap();

        let err = chat
            .send_message(&user, &session.id, "hello", Persona::Counselor)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Llm(_)));
        assert!(chat.load_history(&user, &session.id).await.unwrap().is_empty());
        assert_eq!(chat.get_session(&user, &session.id).await.unwrap().message_count, 0);
    }

    #[tokio::test]
    async fn stream_relays_deltas_then_persists() {
        let (chat, _, _) = service(MockProvider::replying("Take a slow breath."));
        let user = test_user("mira");
        let session = chat.create_session(&user, None).await.unwrap();

        let stream = chat
            .stream_message(&user, &session.id, "panicking", Persona::CbtGuide)
            .await
            .unwrap();
        let events: Vec<_> = stream.collect().await;

        let mut text = String::new();
        let mut final_message = None;
        for event in events {
            match event.unwrap() {
                ChatStreamEvent::TextDelta { text: t } => text.push_str(&t),
                ChatStreamEvent::Message { message } => final_message = Some(message),
            }
        }
        assert_eq!(text, "Take a slow breath.");
        let message = final_message.unwrap();
        assert_eq!(message.content, "Take a slow breath.");
        assert_eq!(message.persona, Some(Persona::CbtGuide));

        let history = chat.load_history(&user, &session.id).await.unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn stream_error_persists_nothing() {
        let (chat, _, _) = service(MockProvider::failing());
        let user = test_user("mira");
        let session = chat.create_session(&user, None).await.unwrap();

        let stream = chat
            .stream_message(&user, &session.id, "hello", Persona::Counselor)
            .await
            .unwrap();
        let events: Vec<_> = stream.collect().await;
        assert!(events.iter().any(|e| matches!(e, Err(ChatError::Llm(_)))));
        assert!(chat.load_history(&user, &session.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stream_rejects_foreign_session_up_front() {
        let (chat, _, _) = service(MockProvider::replying("ok"));
        let owner = test_user("mira");
        let session = chat.create_session(&owner, None).await.unwrap();

        let result = chat
            .stream_message(&test_user("nosy"), &session.id, "hi", Persona::Counselor)
            .await;
        assert!(matches!(result, Err(ChatError::Session(SessionError::NotFound))));
    }

    #[tokio::test]
    async fn stats_count_sessions_and_messages() {
        let (chat, _, _) = service(MockProvider::replying("ok"));
        let user = test_user("mira");
        let a = chat.create_session(&user, Some("a")).await.unwrap();
        chat.create_session(&user, Some("b")).await.unwrap();
        chat.send_message(&user, &a.id, "hi", Persona::Counselor).await.unwrap();

        assert_eq!(chat.stats(&user).await.unwrap(), (2, 2));
    }
}
