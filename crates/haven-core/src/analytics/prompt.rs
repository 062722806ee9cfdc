//! Prompt for the structured mental health assessment.

use std::fmt::Write;

use haven_types::analytics::ChatAnalysisContext;
use haven_types::llm::{Message, MessageRole};

const ANALYSIS_INSTRUCTIONS: &str = r#"ANALYSIS INSTRUCTIONS:
Please provide a comprehensive mental health assessment following these guidelines:

1. EVIDENCE-BASED SCORING: Use the 0-10 scale where:
   - 0-2: Severe concerns requiring immediate attention
   - 3-4: Significant challenges needing professional support
   - 5-6: Moderate concerns with room for improvement
   - 7-8: Good mental health with minor areas to address
   - 9-10: Excellent mental health and coping

2. PARAMETER ASSESSMENT: For each mental health parameter, analyze:
   - Direct statements and expressions of the user
   - Implicit emotional indicators
   - Behavioral patterns mentioned
   - Coping strategies used
   - Language patterns and emotional tone

3. YOUTH-SPECIFIC CONSIDERATIONS: Account for:
   - Developmental stage appropriate expectations
   - Common youth mental health challenges
   - Academic and social pressures
   - Identity formation issues
   - Technology and social media impacts

4. RISK ASSESSMENT: Identify:
   - Immediate safety concerns
   - Concerning patterns requiring attention
   - Protective factors and strengths
   - Support system quality

5. RECOMMENDATIONS: Provide:
   - Actionable, age-appropriate suggestions
   - Evidence-based interventions
   - Professional resources when needed
   - Specific skills to develop

6. CONFIDENCE LEVELS: Base confidence on:
   - Depth and quality of conversation
   - Consistency of indicators
   - Amount of relevant information shared
   - Clarity of emotional expression

CRITICAL ASSESSMENT AREAS:

Anxiety: worry patterns, physical symptoms mentioned, avoidance behaviors, catastrophic thinking, fear expressions, and anxiety management strategies.

Depression: mood descriptions, energy levels, hopelessness, self-worth statements, interest in activities, and social withdrawal patterns.

Stress: pressure handling, overwhelm indicators, coping strategies, time management, and stress responses.

Self-esteem: self-talk patterns, confidence expressions, self-worth statements, achievement orientation, and identity concerns.

Emotional regulation: emotional intensity, mood stability, impulse control, anger management, and emotional awareness.

Social connections: relationship descriptions, social support quality, communication patterns, and isolation indicators.

Cognitive patterns: thinking distortions, problem-solving approaches, rumination patterns, and cognitive flexibility.

Coping mechanisms: stress responses, healthy vs. unhealthy coping, resilience indicators, and adaptation strategies.

Score ranges: every score is 0-10, every confidence is 0-1, severity and risk levels are one of very_low, low, moderate, high, very_high.

Respond with a single JSON object in the exact format specified by the schema, with all required fields present."#;

/// Format the transcript as `User:` / `AI Assistant:` paragraphs.
pub fn format_transcript(history: &[Message]) -> String {
    let mut out = String::new();
    for msg in history {
        let speaker = match msg.role {
            MessageRole::User => "User",
            MessageRole::Assistant => "AI Assistant",
            MessageRole::System => continue,
        };
        let _ = write!(out, "{speaker}: {}\n\n", msg.content);
    }
    out
}

/// Build the assessment prompt from the conversation and its context.
pub fn create_analysis_prompt(history: &[Message], context: &ChatAnalysisContext) -> String {
    let topics = if context.topics_discussed.is_empty() {
        "none detected".to_string()
    } else {
        context.topics_discussed.join(", ")
    };

    format!(
        "You are a highly skilled clinical psychologist and mental health expert with extensive \
experience in youth psychology. Analyze the following conversation between a young person and \
an AI mental health companion. Provide a comprehensive, evidence-based assessment of their \
mental health state.

CONVERSATION CONTEXT:
- Total messages: {total}
- Topics discussed: {topics}
- User engagement level: {engagement:.1}/10
- Conversation quality: {quality:.1}/10

CONVERSATION TO ANALYZE:
{transcript}
{ANALYSIS_INSTRUCTIONS}
",
        total = context.total_messages,
        engagement = context.user_engagement_level,
        quality = context.conversation_quality,
        transcript = format_transcript(history),
    )
}
