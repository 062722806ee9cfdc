//! Configuration types for Haven.
//!
//! `HavenConfig` represents the `config.toml` in the data directory. It
//! selects the chat and analytics model endpoints and the server bind
//! address. Every field has a default, so an empty file is valid.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.haven/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HavenConfig {
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Model settings for companion replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// OpenAI-compatible endpoint (Nebius AI Studio by default).
    #[serde(default = "default_chat_base_url")]
    pub base_url: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_chat_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_chat_temperature")]
    pub temperature: f64,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_chat_api_key_env")]
    pub api_key_env: String,
    /// Maximum number of prior messages sent with each request.
    #[serde(default = "default_history_window")]
    pub history_window: u32,
}

fn default_chat_base_url() -> String {
    "https://api.studio.nebius.com/v1/".to_string()
}

fn default_chat_model() -> String {
    "Qwen/Qwen2.5-32B-Instruct".to_string()
}

fn default_chat_max_tokens() -> u32 {
    3100
}

fn default_chat_temperature() -> f64 {
    0.7
}

fn default_chat_api_key_env() -> String {
    "NEBIUS_API_KEY".to_string()
}

fn default_history_window() -> u32 {
    40
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_chat_base_url(),
            model: default_chat_model(),
            max_tokens: default_chat_max_tokens(),
            temperature: default_chat_temperature(),
            api_key_env: default_chat_api_key_env(),
            history_window: default_history_window(),
        }
    }
}

/// Model settings for conversation analytics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// OpenAI-compatible endpoint (Gemini by default).
    #[serde(default = "default_analytics_base_url")]
    pub base_url: String,
    #[serde(default = "default_analytics_model")]
    pub model: String,
    #[serde(default = "default_analytics_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_analytics_temperature")]
    pub temperature: f64,
    #[serde(default = "default_analytics_api_key_env")]
    pub api_key_env: String,
    /// Checked when `api_key_env` is unset.
    #[serde(default = "default_analytics_api_key_alias")]
    pub api_key_alias_env: Option<String>,
}

fn default_analytics_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai/".to_string()
}

fn default_analytics_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_analytics_max_tokens() -> u32 {
    8192
}

fn default_analytics_temperature() -> f64 {
    0.2
}

fn default_analytics_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_analytics_api_key_alias() -> Option<String> {
    Some("GOOGLE_API_KEY".to_string())
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            base_url: default_analytics_base_url(),
            model: default_analytics_model(),
            max_tokens: default_analytics_max_tokens(),
            temperature: default_analytics_temperature(),
            api_key_env: default_analytics_api_key_env(),
            api_key_alias_env: default_analytics_api_key_alias(),
        }
    }
}

/// HTTP server bind address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
