//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository and hashing traits; AppState pins
//! them to the concrete infra implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use haven_core::analytics::analyzer::{AnalyzerSettings, MentalHealthAnalyzer};
use haven_core::analytics::service::AnalyticsService;
use haven_core::auth::service::AuthService;
use haven_core::chat::service::{ChatService, ChatSettings};
use haven_core::llm::box_provider::BoxLlmProvider;
use haven_infra::config::load_config;
use haven_infra::crypto::hash::Sha256ContentHasher;
use haven_infra::crypto::password::Argon2PasswordHasher;
use haven_infra::crypto::token::OsRngTokenGenerator;
use haven_infra::filesystem::{ensure_data_dir, resolve_data_dir};
use haven_infra::llm::unconfigured::UnconfiguredProvider;
use haven_infra::llm::{create_analytics_provider, create_chat_provider};
use haven_infra::sqlite::chat::SqliteChatRepository;
use haven_infra::sqlite::pool::DatabasePool;
use haven_infra::sqlite::user::SqliteUserRepository;
use haven_types::config::HavenConfig;

pub type ConcreteAuthService = AuthService<
    SqliteUserRepository,
    Argon2PasswordHasher,
    Sha256ContentHasher,
    OsRngTokenGenerator,
>;

pub type ConcreteChatService = ChatService<SqliteChatRepository>;

pub type ConcreteAnalyticsService = AnalyticsService<SqliteChatRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<ConcreteAuthService>,
    pub chat_service: Arc<ConcreteChatService>,
    pub analytics_service: Arc<ConcreteAnalyticsService>,
    pub config: Arc<HavenConfig>,
    pub data_dir: PathBuf,
    /// Why the chat provider is unavailable, if it is.
    pub chat_unavailable: Option<String>,
}

impl AppState {
    /// Initialize the application state: load config, open the DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        ensure_data_dir(&data_dir).await?;

        let config = load_config(&data_dir).await;

        let (chat_provider, chat_unavailable) = match create_chat_provider(&config.chat) {
            Ok(provider) => (provider, None),
            Err(e) => {
                tracing::warn!(error = %e, "Chat provider unavailable");
                let reason = e.to_string();
                (BoxLlmProvider::new(UnconfiguredProvider::new(reason.clone())), Some(reason))
            }
        };
        let analytics_provider = create_analytics_provider(&config.analytics);

        let mut state = Self::build(&data_dir, config, chat_provider, analytics_provider).await?;
        state.chat_unavailable = chat_unavailable;
        Ok(state)
    }

    /// Wire services over the database in `data_dir` with the given providers.
    pub async fn build(
        data_dir: &Path,
        config: HavenConfig,
        chat_provider: BoxLlmProvider,
        analytics_provider: Option<BoxLlmProvider>,
    ) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::open_in(data_dir).await?;

        let auth_service = AuthService::new(
            SqliteUserRepository::new(db_pool.clone()),
            Argon2PasswordHasher::new(),
            Sha256ContentHasher::new(),
            OsRngTokenGenerator,
        );

        let chat_repo = SqliteChatRepository::new(db_pool.clone());
        let chat_service = ChatService::new(
            chat_repo.clone(),
            chat_provider,
            ChatSettings::from(&config.chat),
        );

        let analyzer = MentalHealthAnalyzer::new(
            analytics_provider,
            AnalyzerSettings::from(&config.analytics),
        );
        let analytics_service = AnalyticsService::new(chat_repo, analyzer);

        Ok(Self {
            auth_service: Arc::new(auth_service),
            chat_service: Arc::new(chat_service),
            analytics_service: Arc::new(analytics_service),
            config: Arc::new(config),
            data_dir: data_dir.to_path_buf(),
            chat_unavailable: None,
        })
    }
}
