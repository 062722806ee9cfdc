//! Conversation personas.
//!
//! A persona is a named tone and framing configuration for the prompts sent to
//! the LLM provider. The prompt templates themselves live in `haven-core`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four companion personas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Persona {
    /// Balanced, structured support. The default persona.
    #[default]
    #[serde(rename = "counselor")]
    Counselor,
    /// Active listening and validation, no problem solving.
    #[serde(rename = "listener")]
    CompassionateListener,
    /// Energetic encouragement towards action.
    #[serde(rename = "coach")]
    MotivationalCoach,
    /// Cognitive behavioral reframing of negative thoughts.
    #[serde(rename = "cbt")]
    CbtGuide,
}

impl Persona {
    /// All personas in menu order.
    pub const ALL: [Persona; 4] = [
        Persona::Counselor,
        Persona::CompassionateListener,
        Persona::MotivationalCoach,
        Persona::CbtGuide,
    ];

    /// Stable identifier used in storage and the API.
    pub fn slug(&self) -> &'static str {
        match self {
            Persona::Counselor => "counselor",
            Persona::CompassionateListener => "listener",
            Persona::MotivationalCoach => "coach",
            Persona::CbtGuide => "cbt",
        }
    }

    /// Name the persona speaks under.
    pub fn display_name(&self) -> &'static str {
        match self {
            Persona::Counselor => "Heavenly DelusionZ Counselor",
            Persona::CompassionateListener => "Compassionate Listener",
            Persona::MotivationalCoach => "Motivational Coach",
            Persona::CbtGuide => "CBT Guide",
        }
    }

    /// One-line description shown in persona pickers.
    pub fn description(&self) -> &'static str {
        match self {
            Persona::Counselor => {
                "The balanced and supportive AI that provides empathetic yet structured mental health support."
            }
            Persona::CompassionateListener => {
                "A deeply empathetic AI that focuses on active listening and validation."
            }
            Persona::MotivationalCoach => {
                "A high-energy AI that encourages and empowers users to take action for self-improvement."
            }
            Persona::CbtGuide => {
                "A rational AI that helps reframe negative thoughts using cognitive behavioral techniques."
            }
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Persona {
    type Err = String;

    /// Accepts the slug or the display name, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Persona::ALL
            .into_iter()
            .find(|p| p.slug() == needle || p.display_name().to_lowercase() == needle)
            .ok_or_else(|| format!("unknown persona: '{s}'"))
    }
}

/// Serializable persona listing entry for API and CLI output.
#[derive(Debug, Clone, Serialize)]
pub struct PersonaInfo {
    pub slug: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

impl From<Persona> for PersonaInfo {
    fn from(p: Persona) -> Self {
        Self {
            slug: p.slug(),
            name: p.display_name(),
            description: p.description(),
        }
    }
}
