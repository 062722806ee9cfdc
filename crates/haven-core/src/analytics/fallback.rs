//! Keyword-based assessment used when the analytics model is unavailable
//! or returns something unusable.

use std::collections::BTreeMap;

use chrono::Utc;
use uuid::Uuid;

use haven_types::analytics::{
    CognitivePatternsAssessment, CopingMechanismsAssessment, EmotionalState,
    MentalHealthAnalytics, MentalHealthParameter, SeverityLevel, SocialConnectionAssessment,
};
use haven_types::llm::Message;

use super::context::user_text;

/// Keyword table for one assessed parameter.
#[derive(Debug)]
pub struct ParameterKeywords {
    pub key: &'static str,
    pub description: &'static str,
    pub indicators: &'static [&'static str],
    pub reverse_indicators: &'static [&'static str],
}

pub static MENTAL_HEALTH_PARAMETERS: [ParameterKeywords; 7] = [
    ParameterKeywords {
        key: "anxiety_level",
        description: "Level of anxiety, worry, and nervousness",
        indicators: &["worry", "nervous", "anxious", "panic", "fear", "overwhelmed", "racing thoughts"],
        reverse_indicators: &["calm", "relaxed", "peaceful", "confident"],
    },
    ParameterKeywords {
        key: "depression_indicators",
        description: "Signs of depression, sadness, and hopelessness",
        indicators: &["sad", "hopeless", "empty", "worthless", "depressed", "no energy", "no motivation"],
        reverse_indicators: &["happy", "hopeful", "energetic", "motivated", "content"],
    },
    ParameterKeywords {
        key: "stress_level",
        description: "Level of stress and pressure",
        indicators: &["stressed", "pressure", "overwhelmed", "burned out", "exhausted"],
        reverse_indicators: &["relaxed", "manageable", "balanced", "in control"],
    },
    ParameterKeywords {
        key: "self_esteem",
        description: "Self-worth, confidence, and self-image",
        indicators: &["confident", "proud", "capable", "worthy", "strong"],
        reverse_indicators: &["worthless", "inadequate", "failure", "incompetent", "weak"],
    },
    ParameterKeywords {
        key: "emotional_regulation",
        description: "Ability to manage and control emotions",
        indicators: &["emotional control", "manage feelings", "stay calm", "regulate emotions"],
        reverse_indicators: &["emotional outbursts", "can't control", "overwhelming emotions"],
    },
    ParameterKeywords {
        key: "motivation_level",
        description: "Drive, enthusiasm, and goal-oriented behavior",
        indicators: &["motivated", "driven", "enthusiastic", "goals", "ambitious"],
        reverse_indicators: &["unmotivated", "apathetic", "no drive", "giving up", "listless"],
    },
    ParameterKeywords {
        key: "sleep_quality",
        description: "Sleep patterns, quality, and rest",
        indicators: &["good sleep", "well rested", "sleeping well", "refreshed"],
        reverse_indicators: &["insomnia", "can't sleep", "tired", "exhausted", "sleep problems"],
    },
];

fn keywords(key: &str) -> Option<&'static ParameterKeywords> {
    MENTAL_HEALTH_PARAMETERS.iter().find(|p| p.key == key)
}

/// Score one parameter from keyword hits in `text`.
///
/// With `p` indicator hits and `n` reverse hits: `p > n` gives
/// `max(3, 7 - p)`, otherwise `min(7, 5 + n)`. No hits at all scores 5.
pub fn score_parameter(key: &str, text: &str) -> f64 {
    let Some(table) = keywords(key) else {
        return 5.0;
    };
    let hits = |words: &[&str]| words.iter().filter(|w| text.contains(*w)).count() as i64;
    let p = hits(table.indicators);
    let n = hits(table.reverse_indicators);

    let score = if p > n { (7 - p).max(3) } else { (5 + n).min(7) };
    score as f64
}

fn basic_parameter(name: &str, score: f64) -> MentalHealthParameter {
    MentalHealthParameter {
        name: name.to_string(),
        score,
        severity: SeverityLevel::Moderate,
        confidence: 0.5,
        indicators: vec!["Limited data available".to_string()],
        recommendations: vec![format!("Consider discussing {name} in more detail")],
    }
}

/// Neutral assessment with keyword-derived parameter scores.
pub fn fallback_analysis(
    user_id: Uuid,
    history: &[Message],
    session_id: Option<Uuid>,
) -> MentalHealthAnalytics {
    let text = user_text(history);
    let param = |name: &str, key: &str| basic_parameter(name, score_parameter(key, &text));

    MentalHealthAnalytics {
        assessment_timestamp: Utc::now(),
        user_id,
        session_id,
        anxiety_level: param("anxiety", "anxiety_level"),
        depression_indicators: param("depression", "depression_indicators"),
        stress_level: param("stress", "stress_level"),
        self_esteem: param("self_esteem", "self_esteem"),
        emotional_regulation: param("emotional_regulation", "emotional_regulation"),
        motivation_level: param("motivation", "motivation_level"),
        sleep_quality: param("sleep", "sleep_quality"),
        emotional_state: EmotionalState {
            dominant_emotion: "neutral".to_string(),
            emotion_intensity: 5.0,
            emotional_stability: 5.0,
            emotional_awareness: 5.0,
        },
        cognitive_patterns: CognitivePatternsAssessment {
            cognitive_distortions: Vec::new(),
            thought_patterns: BTreeMap::from([("positive_thinking".to_string(), 5.0)]),
            problem_solving_ability: 5.0,
            self_awareness: 5.0,
        },
        social_connections: SocialConnectionAssessment {
            social_support_quality: 5.0,
            relationship_satisfaction: 5.0,
            social_isolation_level: 5.0,
            communication_skills: 5.0,
        },
        coping_mechanisms: CopingMechanismsAssessment {
            healthy_coping_strategies: vec!["Seeking support".to_string()],
            unhealthy_coping_patterns: Vec::new(),
            stress_management: 5.0,
            resilience_level: 5.0,
        },
        overall_mental_health_score: 5.0,
        risk_level: SeverityLevel::Moderate,
        immediate_concerns: vec!["Need more conversation data for accurate assessment".to_string()],
        strengths: vec!["Seeking help and support".to_string()],
        priority_recommendations: vec!["Continue engaging in supportive conversations".to_string()],
        suggested_interventions: vec!["Regular check-ins with mental health support".to_string()],
        progress_indicators: vec![
            "Frequency of positive expressions".to_string(),
            "Engagement level".to_string(),
        ],
        assessment_confidence: 0.3,
        data_quality: "Limited - insufficient conversation data".to_string(),
        follow_up_needed: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(a: &MentalHealthAnalytics) -> Vec<f64> {
        a.parameters().iter().map(|(_, p)| p.score).collect()
    }

    #[test]
    fn no_keywords_scores_five_everywhere() {
        let history = vec![Message::user("The weather was fine today.")];
        let a = fallback_analysis(Uuid::nil(), &history, None);
        assert_eq!(scores(&a), vec![5.0; 7]);
    }

    #[test]
    fn one_reverse_keyword_scores_six() {
        assert_eq!(score_parameter("anxiety_level", "i felt calm"), 6.0);
    }

    #[test]
    fn three_indicators_score_four() {
        assert_eq!(score_parameter("anxiety_level", "worry, panic and fear"), 4.0);
    }

    #[test]
    fn scores_stay_within_three_and_seven() {
        let many = "worry nervous anxious panic fear overwhelmed racing thoughts";
        assert_eq!(score_parameter("anxiety_level", many), 3.0);
        let calm = "calm relaxed peaceful confident";
        assert_eq!(score_parameter("anxiety_level", calm), 7.0);
    }

    #[test]
    fn only_user_messages_are_scored() {
        let history = vec![
            Message::user("nothing notable"),
            Message::assistant("you seem calm and relaxed"),
        ];
        let a = fallback_analysis(Uuid::nil(), &history, None);
        assert_eq!(a.anxiety_level.score, 5.0);
    }

    #[test]
    fn keyword_matching_is_case_insensitive() {
        let history = vec![Message::user("I have INSOMNIA")];
        let a = fallback_analysis(Uuid::nil(), &history, None);
        assert_eq!(a.sleep_quality.score, 6.0);
    }

    #[test]
    fn neutral_constants() {
        let session = Uuid::now_v7();
        let user = Uuid::now_v7();
        let a = fallback_analysis(user, &[], Some(session));
        assert_eq!(a.user_id, user);
        assert_eq!(a.session_id, Some(session));
        assert_eq!(a.overall_mental_health_score, 5.0);
        assert_eq!(a.risk_level, SeverityLevel::Moderate);
        assert_eq!(a.assessment_confidence, 0.3);
        assert!(a.follow_up_needed);
        assert_eq!(a.anxiety_level.name, "anxiety");
        assert_eq!(a.anxiety_level.confidence, 0.5);
        assert_eq!(
            a.motivation_level.recommendations,
            vec!["Consider discussing motivation in more detail"]
        );
        assert_eq!(a.cognitive_patterns.thought_patterns["positive_thinking"], 5.0);
    }

    #[test]
    fn table_descriptions_are_present() {
        assert!(MENTAL_HEALTH_PARAMETERS.iter().all(|p| !p.description.is_empty()));
    }
}
