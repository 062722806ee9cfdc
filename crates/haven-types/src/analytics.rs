//! Mental health analytics types.
//!
//! `MentalHealthAnalytics` is both the report handed to callers and the JSON
//! shape the analytics model is asked to produce, so every type here derives
//! `JsonSchema`. Model output is untrusted: call
//! [`MentalHealthAnalytics::clamp_ranges`] after deserializing it.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Categorical severity of a parameter or of the overall risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SeverityLevel::VeryLow => "very_low",
            SeverityLevel::Low => "low",
            SeverityLevel::Moderate => "moderate",
            SeverityLevel::High => "high",
            SeverityLevel::VeryHigh => "very_high",
        };
        f.write_str(s)
    }
}

/// Assessment of one mental health parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MentalHealthParameter {
    /// Name of the mental health parameter.
    pub name: String,
    /// Score from 0-10 (0 = very poor, 10 = excellent).
    pub score: f64,
    pub severity: SeverityLevel,
    /// Confidence in this assessment (0-1).
    pub confidence: f64,
    /// Key phrases or behaviors that influenced the score.
    pub indicators: Vec<String>,
    /// Specific recommendations for improvement.
    pub recommendations: Vec<String>,
}

/// Current emotional state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmotionalState {
    /// Primary emotion detected (e.g. anxious, sad, hopeful).
    pub dominant_emotion: String,
    /// Intensity of the dominant emotion (0-10).
    pub emotion_intensity: f64,
    /// 0 = very unstable, 10 = very stable.
    pub emotional_stability: f64,
    /// 0 = unaware, 10 = highly aware.
    pub emotional_awareness: f64,
}

/// Thinking styles and cognitive distortions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CognitivePatternsAssessment {
    /// Identified distortions (e.g. catastrophizing, all-or-nothing thinking).
    pub cognitive_distortions: Vec<String>,
    /// Pattern scores keyed by name (positive_thinking, rumination, ...), 0-10.
    pub thought_patterns: BTreeMap<String, f64>,
    pub problem_solving_ability: f64,
    pub self_awareness: f64,
}

/// Social relationships and support systems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SocialConnectionAssessment {
    pub social_support_quality: f64,
    pub relationship_satisfaction: f64,
    /// 0 = very isolated, 10 = well connected.
    pub social_isolation_level: f64,
    pub communication_skills: f64,
}

/// Coping strategies and resilience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CopingMechanismsAssessment {
    pub healthy_coping_strategies: Vec<String>,
    pub unhealthy_coping_patterns: Vec<String>,
    pub stress_management: f64,
    pub resilience_level: f64,
}

/// A complete mental health assessment of one conversation or of all of a
/// user's conversations.
///
/// `user_id`, `session_id` and `assessment_timestamp` are filled in by the
/// analyzer, not by the model, so they are left out of the JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MentalHealthAnalytics {
    #[schemars(skip)]
    #[serde(default = "Utc::now")]
    pub assessment_timestamp: DateTime<Utc>,
    #[schemars(skip)]
    #[serde(default)]
    pub user_id: Uuid,
    #[schemars(skip)]
    #[serde(default)]
    pub session_id: Option<Uuid>,

    pub anxiety_level: MentalHealthParameter,
    pub depression_indicators: MentalHealthParameter,
    pub stress_level: MentalHealthParameter,
    pub self_esteem: MentalHealthParameter,
    pub emotional_regulation: MentalHealthParameter,
    pub motivation_level: MentalHealthParameter,
    pub sleep_quality: MentalHealthParameter,

    pub emotional_state: EmotionalState,
    pub cognitive_patterns: CognitivePatternsAssessment,
    pub social_connections: SocialConnectionAssessment,
    pub coping_mechanisms: CopingMechanismsAssessment,

    /// Comprehensive mental health score (0-10).
    pub overall_mental_health_score: f64,
    pub risk_level: SeverityLevel,
    pub immediate_concerns: Vec<String>,
    pub strengths: Vec<String>,

    /// Top 3-5 priority recommendations.
    pub priority_recommendations: Vec<String>,
    pub suggested_interventions: Vec<String>,
    pub progress_indicators: Vec<String>,

    /// Overall confidence in this assessment (0-1).
    pub assessment_confidence: f64,
    /// Quality of the conversation data used for the analysis.
    pub data_quality: String,
    /// Whether professional follow-up is recommended.
    pub follow_up_needed: bool,
}

/// Clamp into `0..=max`. NaN becomes 0.
fn bounded(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

impl MentalHealthParameter {
    fn clamp_ranges(&mut self) {
        self.score = bounded(self.score, 10.0);
        self.confidence = bounded(self.confidence, 1.0);
    }
}

impl MentalHealthAnalytics {
    /// The seven core parameters with their display labels, in report order.
    pub fn parameters(&self) -> [(&'static str, &MentalHealthParameter); 7] {
        [
            ("Anxiety Level", &self.anxiety_level),
            ("Depression", &self.depression_indicators),
            ("Stress Level", &self.stress_level),
            ("Self Esteem", &self.self_esteem),
            ("Emotional Regulation", &self.emotional_regulation),
            ("Motivation", &self.motivation_level),
            ("Sleep Quality", &self.sleep_quality),
        ]
    }

    fn parameters_mut(&mut self) -> [&mut MentalHealthParameter; 7] {
        [
            &mut self.anxiety_level,
            &mut self.depression_indicators,
            &mut self.stress_level,
            &mut self.self_esteem,
            &mut self.emotional_regulation,
            &mut self.motivation_level,
            &mut self.sleep_quality,
        ]
    }

    /// Force every bounded field into its range: scores 0-10, confidences 0-1.
    pub fn clamp_ranges(&mut self) {
        for param in self.parameters_mut() {
            param.clamp_ranges();
        }

        let es = &mut self.emotional_state;
        es.emotion_intensity = bounded(es.emotion_intensity, 10.0);
        es.emotional_stability = bounded(es.emotional_stability, 10.0);
        es.emotional_awareness = bounded(es.emotional_awareness, 10.0);

        let cp = &mut self.cognitive_patterns;
        for score in cp.thought_patterns.values_mut() {
            *score = bounded(*score, 10.0);
        }
        cp.problem_solving_ability = bounded(cp.problem_solving_ability, 10.0);
        cp.self_awareness = bounded(cp.self_awareness, 10.0);

        let sc = &mut self.social_connections;
        sc.social_support_quality = bounded(sc.social_support_quality, 10.0);
        sc.relationship_satisfaction = bounded(sc.relationship_satisfaction, 10.0);
        sc.social_isolation_level = bounded(sc.social_isolation_level, 10.0);
        sc.communication_skills = bounded(sc.communication_skills, 10.0);

        let cm = &mut self.coping_mechanisms;
        cm.stress_management = bounded(cm.stress_management, 10.0);
        cm.resilience_level = bounded(cm.resilience_level, 10.0);

        self.overall_mental_health_score = bounded(self.overall_mental_health_score, 10.0);
        self.assessment_confidence = bounded(self.assessment_confidence, 1.0);
    }

    /// Parameter scores on a higher-is-better scale, with confidence.
    ///
    /// Anxiety, depression and stress measure a problem, so they are shown
    /// as `10 - score`.
    pub fn wellness_scores(&self) -> Vec<WellnessScore> {
        self.parameters()
            .into_iter()
            .enumerate()
            .map(|(i, (label, param))| WellnessScore {
                label,
                score: if i < 3 { 10.0 - param.score } else { param.score },
                confidence: param.confidence,
            })
            .collect()
    }

    /// Interpretation of the overall score.
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.overall_mental_health_score)
    }
}

/// One bar of the wellness overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellnessScore {
    pub label: &'static str,
    pub score: f64,
    pub confidence: f64,
}

/// Deterministic facts about a conversation, computed before analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAnalysisContext {
    pub total_messages: usize,
    /// Estimated conversation duration.
    pub conversation_length_minutes: Option<f64>,
    pub topics_discussed: Vec<String>,
    pub emotional_journey: Vec<String>,
    /// Engagement and openness, 0-10.
    pub user_engagement_level: f64,
    /// Depth of the conversation, 0-10.
    pub conversation_quality: f64,
}

/// Verbal interpretation of a 0-10 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Moderate,
    Significant,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            ScoreBand::Excellent
        } else if score >= 6.0 {
            ScoreBand::Good
        } else if score >= 4.0 {
            ScoreBand::Moderate
        } else {
            ScoreBand::Significant
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent Mental Health",
            ScoreBand::Good => "Good Mental Health",
            ScoreBand::Moderate => "Moderate Concerns",
            ScoreBand::Significant => "Significant Concerns",
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, score: f64) -> MentalHealthParameter {
        MentalHealthParameter {
            name: name.to_string(),
            score,
            severity: SeverityLevel::Moderate,
            confidence: 0.5,
            indicators: vec![],
            recommendations: vec![],
        }
    }

    fn sample() -> MentalHealthAnalytics {
        MentalHealthAnalytics {
            assessment_timestamp: Utc::now(),
            user_id: Uuid::nil(),
            session_id: None,
            anxiety_level: param("anxiety", 2.0),
            depression_indicators: param("depression", 3.0),
            stress_level: param("stress", 4.0),
            self_esteem: param("self_esteem", 6.0),
            emotional_regulation: param("emotional_regulation", 7.0),
            motivation_level: param("motivation", 8.0),
            sleep_quality: param("sleep", 9.0),
            emotional_state: EmotionalState {
                dominant_emotion: "hopeful".to_string(),
                emotion_intensity: 5.0,
                emotional_stability: 5.0,
                emotional_awareness: 5.0,
            },
            cognitive_patterns: CognitivePatternsAssessment {
                cognitive_distortions: vec![],
                thought_patterns: BTreeMap::from([("rumination".to_string(), 3.0)]),
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
                healthy_coping_strategies: vec![],
                unhealthy_coping_patterns: vec![],
                stress_management: 5.0,
                resilience_level: 5.0,
            },
            overall_mental_health_score: 6.5,
            risk_level: SeverityLevel::Low,
            immediate_concerns: vec![],
            strengths: vec![],
            priority_recommendations: vec![],
            suggested_interventions: vec![],
            progress_indicators: vec![],
            assessment_confidence: 0.8,
            data_quality: "good".to_string(),
            follow_up_needed: false,
        }
    }

    #[test]
    fn test_clamp_ranges() {
        let mut a = sample();
        a.anxiety_level.score = 14.0;
        a.stress_level.confidence = 1.7;
        a.emotional_state.emotion_intensity = -3.0;
        a.cognitive_patterns
            .thought_patterns
            .insert("catastrophizing".to_string(), 11.0);
        a.overall_mental_health_score = f64::NAN;
        a.assessment_confidence = 2.0;

        a.clamp_ranges();

        assert_eq!(a.anxiety_level.score, 10.0);
        assert_eq!(a.stress_level.confidence, 1.0);
        assert_eq!(a.emotional_state.emotion_intensity, 0.0);
        assert_eq!(a.cognitive_patterns.thought_patterns["catastrophizing"], 10.0);
        assert_eq!(a.overall_mental_health_score, 0.0);
        assert_eq!(a.assessment_confidence, 1.0);
        // In-range values are untouched.
        assert_eq!(a.sleep_quality.score, 9.0);
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::from_score(8.0), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(7.9), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(4.0), ScoreBand::Moderate);
        assert_eq!(ScoreBand::from_score(3.99), ScoreBand::Significant);
        assert_eq!(sample().band().label(), "Good Mental Health");
    }

    #[test]
    fn test_wellness_scores_invert_problem_parameters() {
        let scores = sample().wellness_scores();
        assert_eq!(scores.len(), 7);
        assert_eq!(scores[0].label, "Anxiety Level");
        assert_eq!(scores[0].score, 8.0);
        assert_eq!(scores[2].score, 6.0);
        assert_eq!(scores[3].score, 6.0);
        assert_eq!(scores[6].score, 9.0);
    }

    #[test]
    fn test_schema_omits_metadata_fields() {
        let schema = serde_json::to_value(schemars::schema_for!(MentalHealthAnalytics)).unwrap();
        let props = schema["properties"].as_object().unwrap();
        assert!(props.contains_key("anxiety_level"));
        assert!(props.contains_key("follow_up_needed"));
        assert!(!props.contains_key("user_id"));
        assert!(!props.contains_key("session_id"));
        assert!(!props.contains_key("assessment_timestamp"));
    }

    #[test]
    fn test_deserialize_model_output_without_metadata() {
        let mut value = serde_json::to_value(sample()).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("user_id");
        obj.remove("session_id");
        obj.remove("assessment_timestamp");

        let parsed: MentalHealthAnalytics = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.user_id, Uuid::nil());
        assert!(parsed.session_id.is_none());
        assert_eq!(parsed.risk_level, SeverityLevel::Low);
    }

    #[test]
    fn test_severity_serde() {
        let json = serde_json::to_string(&SeverityLevel::VeryHigh).unwrap();
        assert_eq!(json, "\"very_high\"");
        assert_eq!(SeverityLevel::VeryLow.to_string(), "very_low");
    }
}
