//! OpenAI SSE stream to [`StreamEvent`] adapter.

use std::pin::Pin;

use async_openai::types::chat::{ChatCompletionResponseStream, FinishReason};
use futures_util::{Stream, StreamExt};

use haven_types::llm::{LlmError, StopReason, StreamEvent, Usage};

/// Map an OpenAI finish reason onto Haven's stop reasons.
pub(crate) fn map_finish_reason(reason: &FinishReason) -> StopReason {
    match reason {
        FinishReason::Length => StopReason::MaxTokens,
        FinishReason::ContentFilter => StopReason::ContentFilter,
        FinishReason::Stop | FinishReason::ToolCalls | FinishReason::FunctionCall => {
            StopReason::EndTurn
        }
    }
}

/// Map an async-openai chunk stream to provider-agnostic events.
///
/// Order: `Connected`, then `TextDelta`s, a `MessageDelta` when a finish
/// reason arrives, `Usage` from the final chunk (requires
/// `stream_options.include_usage`), and `Done`.
pub fn map_openai_stream(
    stream: ChatCompletionResponseStream,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
    Box::pin(async_stream::try_stream! {
        yield StreamEvent::Connected;

        let mut stream = stream;
        while let Some(result) = stream.next().await {
            let chunk = result.map_err(|e| LlmError::Stream(e.to_string()))?;

            for choice in &chunk.choices {
                if let Some(text) = choice.delta.content.as_ref().filter(|t| !t.is_empty()) {
                    yield StreamEvent::TextDelta { text: text.clone() };
                }
                if let Some(reason) = choice.finish_reason.as_ref() {
                    yield StreamEvent::MessageDelta {
                        stop_reason: map_finish_reason(reason),
                    };
                }
            }

            // The usage chunk arrives last, with an empty choices array.
            if let Some(usage) = chunk.usage.as_ref() {
                yield StreamEvent::Usage(Usage {
                    input_tokens: usage.prompt_tokens,
                    output_tokens: usage.completion_tokens,
                });
            }
        }

        yield StreamEvent::Done;
    })
}
