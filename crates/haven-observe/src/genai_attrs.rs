//! OpenTelemetry GenAI Semantic Convention attribute names.
//!
//! Used as span field names on LLM calls so chat and analytics requests are
//! instrumented consistently. Span naming convention: `"{operation} {model}"`
//! (e.g. `"chat Qwen/Qwen2.5-32B-Instruct"`).

// --- Required attributes ---

/// The name of the operation being performed (e.g. "chat", "analyze").
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The name of the GenAI provider (e.g. "nebius").
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

// --- Recommended attributes ---

pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";

pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";

pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";

pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";

/// The finish reasons for the response (e.g. "end_turn", "max_tokens").
pub const GEN_AI_RESPONSE_FINISH_REASONS: &str = "gen_ai.response.finish_reasons";

pub const GEN_AI_RESPONSE_ID: &str = "gen_ai.response.id";

// --- Companion-specific attributes ---

/// Slug of the persona answering the message.
pub const HAVEN_PERSONA: &str = "haven.persona";

/// Chat session the request belongs to.
pub const HAVEN_SESSION_ID: &str = "haven.session.id";

// --- Operation name values ---

/// Companion reply to a user message.
pub const OP_CHAT: &str = "chat";

/// Mental health analysis of a conversation.
pub const OP_ANALYZE: &str = "analyze";

// --- Provider name values ---

pub const PROVIDER_NEBIUS: &str = "nebius";

pub const PROVIDER_GEMINI: &str = "gemini";

/// Any other OpenAI-compatible endpoint.
pub const PROVIDER_OPENAI_COMPATIBLE: &str = "openai_compatible";
