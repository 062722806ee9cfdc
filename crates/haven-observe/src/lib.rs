//! Observability setup for Haven: tracing subscriber initialization and
//! GenAI semantic-convention attribute names for LLM spans.

pub mod genai_attrs;
pub mod tracing_setup;
