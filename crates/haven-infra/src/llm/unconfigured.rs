//! Stand-in chat provider used when no API key is configured.
//!
//! Lets commands that never call the model (registration, session
//! listing, export, analytics) run without a key. Every model call fails
//! with the setup error instead.

use std::pin::Pin;

use futures_util::Stream;

use haven_core::llm::provider::LlmProvider;
use haven_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StreamEvent,
};

pub struct UnconfiguredProvider {
    reason: String,
    capabilities: ProviderCapabilities,
}

impl UnconfiguredProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            capabilities: ProviderCapabilities {
                streaming: false,
                structured_output: false,
                max_context_tokens: 0,
                max_output_tokens: 0,
            },
        }
    }

    fn error(&self) -> LlmError {
        LlmError::InvalidRequest(self.reason.clone())
    }
}

impl LlmProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        "unconfigured"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(self.error())
    }

    fn stream(
        &self,
        _request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        Box::pin(futures_util::stream::once(std::future::ready(Err(self.error()))))
    }
}
