//! Configuration and per-provider defaults for OpenAI-compatible endpoints.

use secrecy::SecretString;

use haven_types::llm::ProviderCapabilities;

pub const NEBIUS_BASE_URL: &str = "https://api.studio.nebius.com/v1/";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";

/// Configuration for an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Provider name reported in spans and logs (e.g. "nebius").
    pub provider_name: String,
    pub base_url: String,
    pub api_key: SecretString,
    /// Model used when a request leaves `model` empty.
    pub model: String,
    pub capabilities: ProviderCapabilities,
}

/// Nebius AI Studio, the companion chat endpoint.
pub fn nebius_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: haven_observe::genai_attrs::PROVIDER_NEBIUS.into(),
        base_url: NEBIUS_BASE_URL.into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            streaming: true,
            structured_output: false,
            max_context_tokens: 32_768,
            max_output_tokens: 8_192,
        },
    }
}

/// Google Gemini through its OpenAI-compatible beta endpoint.
pub fn gemini_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: haven_observe::genai_attrs::PROVIDER_GEMINI.into(),
        base_url: GEMINI_BASE_URL.into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            streaming: true,
            structured_output: true,
            max_context_tokens: 1_000_000,
            max_output_tokens: 8_192,
        },
    }
}

/// Name a provider after its base URL, for configs pointing elsewhere.
pub fn provider_name_for(base_url: &str) -> &'static str {
    if base_url.contains("nebius") {
        haven_observe::genai_attrs::PROVIDER_NEBIUS
    } else if base_url.contains("generativelanguage.googleapis.com") {
        haven_observe::genai_attrs::PROVIDER_GEMINI
    } else {
        haven_observe::genai_attrs::PROVIDER_OPENAI_COMPATIBLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name_for() {
        assert_eq!(provider_name_for(NEBIUS_BASE_URL), "nebius");
        assert_eq!(provider_name_for(GEMINI_BASE_URL), "gemini");
        assert_eq!(provider_name_for("http://localhost:11434/v1"), "openai_compatible");
    }

    #[test]
    fn test_gemini_supports_structured_output() {
        let config = gemini_defaults(SecretString::from("k"), "gemini-1.5-flash");
        assert!(config.capabilities.structured_output);
        assert_eq!(config.model, "gemini-1.5-flash");
    }
}
