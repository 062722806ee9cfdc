//! Conversation analytics.
//!
//! `MentalHealthAnalyzer` asks the analytics model for a structured
//! assessment and falls back to keyword scoring whenever that is not
//! possible. `AnalyticsService` selects the conversation to analyze and
//! enforces session ownership.

pub mod analyzer;
pub mod context;
pub mod fallback;
pub mod prompt;
pub mod service;

pub use analyzer::{AnalysisSource, AnalyzerSettings, MentalHealthAnalyzer};
pub use context::prepare_context;
pub use fallback::fallback_analysis;
pub use prompt::create_analysis_prompt;
pub use service::{AnalyticsReport, AnalyticsService};
