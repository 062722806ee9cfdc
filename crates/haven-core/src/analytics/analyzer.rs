//! LLM-backed mental health analyzer.
//!
//! The analytics model receives the clinical prompt plus the JSON schema of
//! `MentalHealthAnalytics` as a structured-output constraint. Analysis never
//! fails from the caller's point of view: a missing provider, a provider
//! error, or unparsable output all degrade to [`fallback_analysis`].

use chrono::Utc;
use serde::Serialize;
use tracing::{Instrument, info_span, warn};
use uuid::Uuid;

use haven_types::analytics::MentalHealthAnalytics;
use haven_types::config::AnalyticsConfig;
use haven_types::llm::{CompletionRequest, LlmError, Message, ResponseSchema};

use crate::analytics::context::prepare_context;
use crate::analytics::fallback::fallback_analysis;
use crate::analytics::prompt::create_analysis_prompt;
use crate::llm::box_provider::BoxLlmProvider;

/// Model parameters for analysis calls.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl From<&AnalyticsConfig> for AnalyzerSettings {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Where a report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Model,
    Fallback,
}

#[derive(Debug, thiserror::Error)]
enum AnalysisError {
    #[error("no analytics provider configured")]
    NoProvider,

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("unparsable analysis: {0}")]
    Parse(String),
}

pub struct MentalHealthAnalyzer {
    provider: Option<BoxLlmProvider>,
    settings: AnalyzerSettings,
}

impl MentalHealthAnalyzer {
    pub fn new(provider: Option<BoxLlmProvider>, settings: AnalyzerSettings) -> Self {
        Self { provider, settings }
    }

    /// Whether a model is available. Without one every analysis is a fallback.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// JSON schema of `MentalHealthAnalytics`, minus the `$schema` key.
    pub fn analysis_schema() -> serde_json::Value {
        let mut schema = serde_json::to_value(schemars::schema_for!(MentalHealthAnalytics))
            .unwrap_or(serde_json::Value::Null);
        if let Some(obj) = schema.as_object_mut() {
            obj.remove("$schema");
        }
        schema
    }

    /// Analyze a conversation. See [`Self::analyze_with_source`].
    pub async fn analyze_conversation(
        &self,
        user_id: Uuid,
        history: &[Message],
        session_id: Option<Uuid>,
    ) -> MentalHealthAnalytics {
        self.analyze_with_source(user_id, history, session_id).await.0
    }

    /// Analyze a conversation and report whether the model or the keyword
    /// fallback produced the result.
    #[tracing::instrument(skip(self, history), fields(messages = history.len()))]
    pub async fn analyze_with_source(
        &self,
        user_id: Uuid,
        history: &[Message],
        session_id: Option<Uuid>,
    ) -> (MentalHealthAnalytics, AnalysisSource) {
        match self.model_analysis(history).await {
            Ok(mut analytics) => {
                analytics.user_id = user_id;
                analytics.session_id = session_id;
                analytics.assessment_timestamp = Utc::now();
                analytics.clamp_ranges();
                (analytics, AnalysisSource::Model)
            }
            Err(AnalysisError::NoProvider) => (
                fallback_analysis(user_id, history, session_id),
                AnalysisSource::Fallback,
            ),
            Err(e) => {
                warn!(error = %e, "Model analysis failed, using keyword fallback");
                (
                    fallback_analysis(user_id, history, session_id),
                    AnalysisSource::Fallback,
                )
            }
        }
    }

    async fn model_analysis(&self, history: &[Message]) -> Result<MentalHealthAnalytics, AnalysisError> {
        let provider = self.provider.as_ref().ok_or(AnalysisError::NoProvider)?;

        let context = prepare_context(history);
        let prompt = create_analysis_prompt(history, &context);
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![Message::user(prompt)],
            system: None,
            max_tokens: self.settings.max_tokens,
            temperature: Some(self.settings.temperature),
            stream: false,
            response_schema: Some(ResponseSchema {
                name: "MentalHealthAnalytics".to_string(),
                schema: Self::analysis_schema(),
                strict: false,
            }),
        };

        let span = info_span!(
            "analyze",
            gen_ai.operation.name = haven_observe::genai_attrs::OP_ANALYZE,
            gen_ai.provider.name = provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
        );
        let response = provider.complete(&request).instrument(span.clone()).await?;
        span.record(haven_observe::genai_attrs::GEN_AI_USAGE_INPUT_TOKENS, response.usage.input_tokens);
        span.record(haven_observe::genai_attrs::GEN_AI_USAGE_OUTPUT_TOKENS, response.usage.output_tokens);

        parse_analysis(&response.content)
    }
}

/// Strip an optional Markdown code fence around the JSON body.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_analysis(raw: &str) -> Result<MentalHealthAnalytics, AnalysisError> {
    serde_json::from_str(strip_code_fence(raw)).map_err(|e| AnalysisError::Parse(e.to_string()))
}
