//! LLM provider construction.
//!
//! Builds the chat and analytics providers from config plus API keys read
//! from the environment. Both are [`OpenAiCompatibleProvider`]s pointed at
//! different base URLs.

pub mod openai_compat;
pub mod unconfigured;

use secrecy::SecretString;

use haven_core::llm::box_provider::BoxLlmProvider;
use haven_core::llm::provider::LlmProvider;
use haven_types::config::{AnalyticsConfig, ChatConfig};

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::{
    GEMINI_BASE_URL, NEBIUS_BASE_URL, OpenAiCompatConfig, gemini_defaults, nebius_defaults,
    provider_name_for,
};

#[derive(Debug, thiserror::Error)]
pub enum ProviderSetupError {
    #[error("API key not found: set the {0} environment variable")]
    MissingApiKey(String),
}

/// First non-empty value among the named variables.
fn resolve_key<F>(names: &[&str], lookup: F) -> Option<SecretString>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .map(SecretString::from)
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn build_provider(
    base_url: &str,
    api_key: SecretString,
    model: &str,
    defaults: fn(SecretString, &str) -> OpenAiCompatConfig,
    default_base_url: &str,
) -> OpenAiCompatibleProvider {
    let mut config = defaults(api_key, model);
    if base_url.trim_end_matches('/') != default_base_url.trim_end_matches('/') {
        config.base_url = base_url.to_string();
        config.provider_name = provider_name_for(base_url).to_string();
    }
    OpenAiCompatibleProvider::new(config)
}

/// Provider for companion replies. The API key is required.
pub fn create_chat_provider(config: &ChatConfig) -> Result<BoxLlmProvider, ProviderSetupError> {
    create_chat_provider_with(config, env_lookup)
}

fn create_chat_provider_with<F>(config: &ChatConfig, lookup: F) -> Result<BoxLlmProvider, ProviderSetupError>
where
    F: Fn(&str) -> Option<String>,
{
    let key = resolve_key(&[config.api_key_env.as_str()], lookup)
        .ok_or_else(|| ProviderSetupError::MissingApiKey(config.api_key_env.clone()))?;
    let provider = build_provider(&config.base_url, key, &config.model, nebius_defaults, NEBIUS_BASE_URL);
    tracing::debug!(provider = provider.name(), model = %config.model, "Chat provider ready");
    Ok(BoxLlmProvider::new(provider))
}

/// Provider for analytics, or `None` when no key is configured. Analytics
/// then always use the keyword fallback.
pub fn create_analytics_provider(config: &AnalyticsConfig) -> Option<BoxLlmProvider> {
    create_analytics_provider_with(config, env_lookup)
}

fn create_analytics_provider_with<F>(config: &AnalyticsConfig, lookup: F) -> Option<BoxLlmProvider>
where
    F: Fn(&str) -> Option<String>,
{
    let mut names = vec![config.api_key_env.as_str()];
    if let Some(alias) = config.api_key_alias_env.as_deref() {
        names.push(alias);
    }

    let Some(key) = resolve_key(&names, lookup) else {
        tracing::info!(
            env = %config.api_key_env,
            "No analytics API key, analytics will use keyword scoring"
        );
        return None;
    };
    let provider = build_provider(&config.base_url, key, &config.model, gemini_defaults, GEMINI_BASE_URL);
    Some(BoxLlmProvider::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_resolve_key_prefers_first_non_empty() {
        let lookup = env(&[("A", "  "), ("B", "key-b")]);
        let key = resolve_key(&["A", "B"], lookup).unwrap();
        assert_eq!(key.expose_secret(), "key-b");
        assert!(resolve_key(&["C"], env(&[])).is_none());
    }

    #[test]
    fn test_chat_provider_requires_key() {
        let config = ChatConfig::default();
        let err = create_chat_provider_with(&config, env(&[])).unwrap_err();
        assert!(err.to_string().contains("NEBIUS_API_KEY"));

        let provider = create_chat_provider_with(&config, env(&[("NEBIUS_API_KEY", "k")])).unwrap();
        assert_eq!(provider.name(), "nebius");
    }

    #[test]
    fn test_custom_base_url_renames_provider() {
        let config = ChatConfig {
            base_url: "http://localhost:11434/v1".to_string(),
            ..ChatConfig::default()
        };
        let provider = create_chat_provider_with(&config, env(&[("NEBIUS_API_KEY", "k")])).unwrap();
        assert_eq!(provider.name(), "openai_compatible");
    }

    #[test]
    fn test_analytics_provider_is_optional() {
        let config = AnalyticsConfig::default();
        assert!(create_analytics_provider_with(&config, env(&[])).is_none());

        let provider = create_analytics_provider_with(&config, env(&[("GOOGLE_API_KEY", "g")]));
        assert_eq!(provider.unwrap().name(), "gemini");
    }
}
