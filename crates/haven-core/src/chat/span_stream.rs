//! Keeps a tracing span entered while a provider stream is polled.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;

use haven_types::llm::{LlmError, StreamEvent};

pub(crate) type ProviderStream =
    Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;

pub(crate) struct StreamInSpan {
    inner: ProviderStream,
    span: tracing::Span,
}

impl StreamInSpan {
    pub(crate) fn new(inner: ProviderStream, span: tracing::Span) -> Self {
        Self { inner, span }
    }
}

impl Stream for StreamInSpan {
    type Item = Result<StreamEvent, LlmError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // Both fields are Unpin, so no projection is needed.
        let this = self.get_mut();
        let _enter = this.span.enter();
        this.inner.as_mut().poll_next(cx)
    }
}
