//! Deterministic conversation statistics computed before analysis.

use haven_types::analytics::ChatAnalysisContext;
use haven_types::llm::{Message, MessageRole};

/// Topic keywords, matched as substrings of the lower-cased user text.
const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("anxiety", &["anxious", "worry", "nervous", "panic", "fear"]),
    ("depression", &["sad", "depressed", "hopeless", "empty", "down"]),
    ("stress", &["stress", "pressure", "overwhelmed", "burnout"]),
    (
        "relationships",
        &["friend", "family", "relationship", "partner", "social"],
    ),
    (
        "work_school",
        &["work", "school", "job", "study", "career", "college"],
    ),
    ("sleep", &["sleep", "tired", "exhausted", "insomnia", "rest"]),
    (
        "self_esteem",
        &["confidence", "self-worth", "inadequate", "capable", "failure"],
    ),
];

/// Estimated minutes per message.
const MINUTES_PER_MESSAGE: f64 = 2.0;

/// The user's side of the conversation, joined and lower-cased.
pub(crate) fn user_text(history: &[Message]) -> String {
    history
        .iter()
        .filter(|m| m.role == MessageRole::User)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Topics whose keywords occur in the text, in table order.
pub fn detect_topics(text: &str) -> Vec<String> {
    TOPIC_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(topic, _)| topic.to_string())
        .collect()
}

/// Compute the analysis context for a conversation.
///
/// - quality grows with average user message length: `min(10, avg/50*5 + 5)`
/// - engagement grows with the number of user messages: `min(10, n/3*10)`
/// - duration is estimated at two minutes per message
pub fn prepare_context(history: &[Message]) -> ChatAnalysisContext {
    let user_messages: Vec<&Message> = history
        .iter()
        .filter(|m| m.role == MessageRole::User)
        .collect();

    let total_chars: usize = user_messages.iter().map(|m| m.content.chars().count()).sum();
    let avg_len = total_chars as f64 / user_messages.len().max(1) as f64;
    let conversation_quality = (avg_len / 50.0 * 5.0 + 5.0).min(10.0);

    let user_engagement_level = (user_messages.len() as f64 / 3.0 * 10.0).min(10.0);

    ChatAnalysisContext {
        total_messages: history.len(),
        conversation_length_minutes: Some(history.len() as f64 * MINUTES_PER_MESSAGE),
        topics_discussed: detect_topics(&user_text(history)),
        emotional_journey: vec![
            "initial_state".to_string(),
            "exploration".to_string(),
            "insights".to_string(),
        ],
        user_engagement_level,
        conversation_quality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history() {
        let ctx = prepare_context(&[]);
        assert_eq!(ctx.total_messages, 0);
        assert_eq!(ctx.conversation_length_minutes, Some(0.0));
        assert!(ctx.topics_discussed.is_empty());
        assert_eq!(ctx.user_engagement_level, 0.0);
        assert_eq!(ctx.conversation_quality, 5.0);
        assert_eq!(ctx.emotional_journey.len(), 3);
    }

    #[test]
    fn formulas() {
        let history = vec![
            Message::user("x".repeat(50)),
            Message::assistant("reply that does not count towards quality"),
            Message::user("y".repeat(100)),
        ];
        let ctx = prepare_context(&history);
        assert_eq!(ctx.total_messages, 3);
        assert_eq!(ctx.conversation_length_minutes, Some(6.0));
        // avg 75 chars -> 75/50*5 + 5 = 12.5, capped at 10
        assert_eq!(ctx.conversation_quality, 10.0);
        assert!((ctx.user_engagement_level - 20.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn engagement_caps_at_ten() {
        let history: Vec<Message> = (0..5).map(|i| Message::user(format!("m{i}"))).collect();
        assert_eq!(prepare_context(&history).user_engagement_level, 10.0);
    }

    #[test]
    fn topics_in_table_order_from_user_text_only() {
        let history = vec![
            Message::user("I can't SLEEP and work is piling up, I panic"),
            Message::assistant("Talk to a friend about your family"),
        ];
        let ctx = prepare_context(&history);
        assert_eq!(ctx.topics_discussed, vec!["anxiety", "work_school", "sleep"]);
    }

    #[test]
    fn topic_keywords_match_substrings() {
        // "stressed" contains "stress", "homework" contains "work"
        assert_eq!(detect_topics("stressed about homework"), vec!["stress", "work_school"]);
    }
}
