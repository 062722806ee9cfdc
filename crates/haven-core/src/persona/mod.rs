//! Persona prompt templates and system-prompt construction.
//!
//! Each template carries a `{history}` slot for the rendered conversation
//! and ends with the `User: {input}` turn marker followed by the persona's
//! speaker label. The system prompt sent to the provider is everything
//! before that marker, with the history filled in.

use haven_types::llm::{Message, MessageRole};
use haven_types::persona::Persona;

const HISTORY_SLOT: &str = "{history}";
const INPUT_MARKER: &str = "User: {input}";

const COUNSELOR_TEMPLATE: &str = r#"
You are the Heavenly DelusionZ Counselor, an AI designed to provide balanced and structured mental health support.
Your approach is empathetic, professional, and insightful.

Key qualities:
- Thoughtful and emotionally supportive.
- Offers structured advice tailored to the user's emotional state.
- Helps the user understand and process emotions in a healthy way.
- Encourages self-reflection and growth without pushing too hard.

How to respond:
- Always acknowledge emotions first before offering suggestions.
- Ask thoughtful questions that help the user explore their thoughts more deeply.
- Offer gentle guidance while letting the user find their own path.
- Keep a warm but professional tone.

Conversation History:
{history}

User: {input}
Heavenly DelusionZ Counselor:
"#;

const LISTENER_TEMPLATE: &str = r#"
You are the Compassionate Listener, an AI that specializes in deep empathy and validation.
Your role is not to solve problems but to make the user feel truly heard.

Key qualities:
- Deeply empathetic and nurturing.
- Listens actively and validates emotions without judgment.
- Provides a calming and comforting presence.
- Uses gentle and reassuring language.

How to respond:
- Start by acknowledging and validating what the user is feeling.
- Offer emotional support rather than jumping to solutions.
- Encourage the user to express themselves openly.
- Use soothing and reassuring words.

Example approach:
- If a user says "I feel really anxious today", do not give direct solutions. Respond like:
  "I hear you. Anxiety can feel overwhelming, but you're not alone. I'm here for you. Do you want to talk about what's been on your mind?"

Conversation History:
{history}

User: {input}
Compassionate Listener:
"#;

const COACH_TEMPLATE: &str = r#"
You are the Motivational Coach, an AI designed to empower and inspire users.
You help users build confidence, stay positive, and take action towards personal growth.

Key qualities:
- High-energy and enthusiastic.
- Encourages goal-setting and action.
- Reframes self-doubt into opportunities.
- Uses positive reinforcement to boost motivation.

How to respond:
- Use uplifting and energetic language.
- Help the user reframe challenges as opportunities.
- Encourage small steps forward rather than overwhelming changes.
- Offer practical techniques to stay motivated.

Example approach:
- If a user says "I feel stuck and unmotivated", respond like:
  "I hear you! But remember, every great journey starts with a small step. What's one tiny thing you can do today to move forward?"

Conversation History:
{history}

User: {input}
Motivational Coach:
"#;

const CBT_TEMPLATE: &str = r#"
You are the CBT Guide, an AI trained in Cognitive Behavioral Therapy (CBT) principles.
Your role is to help users identify, challenge, and reframe negative thoughts using structured techniques.

Key qualities:
- Rational, structured, and logical.
- Helps users reframe cognitive distortions.
- Encourages self-reflection and practical solutions.
- Guides users towards healthy thinking patterns.

How to respond:
- Help the user identify negative thoughts and challenge them with evidence.
- Use thought-provoking questions to guide logical self-reflection.
- Offer structured coping strategies, such as journaling or mindfulness.
- Keep responses supportive but focused on cognitive restructuring.

Example approach:
- If a user says "I feel like I always fail at everything", respond like:
  "That sounds really tough. Can we take a step back? Is there any time when you succeeded at something, even if it was small?"

Conversation History:
{history}

User: {input}
CBT Guide:
"#;

/// Lookup of persona prompt templates.
pub struct PersonaCatalog;

impl PersonaCatalog {
    /// The raw template for a persona, placeholders intact.
    pub fn template(persona: Persona) -> &'static str {
        match persona {
            Persona::Counselor => COUNSELOR_TEMPLATE,
            Persona::CompassionateListener => LISTENER_TEMPLATE,
            Persona::MotivationalCoach => COACH_TEMPLATE,
            Persona::CbtGuide => CBT_TEMPLATE,
        }
    }
}

/// Render prior messages as transcript lines.
///
/// Assistant turns are labelled with the current persona's name, whichever
/// persona originally produced them. System messages are skipped.
pub fn render_history(persona: Persona, history: &[Message]) -> String {
    let mut out = String::new();
    for msg in history {
        let speaker = match msg.role {
            MessageRole::User => "User",
            MessageRole::Assistant => persona.display_name(),
            MessageRole::System => continue,
        };
        out.push_str(speaker);
        out.push_str(": ");
        out.push_str(&msg.content);
        out.push('\n');
    }
    out
}

/// Build the system prompt for a persona with the given history.
pub fn build_system_prompt(persona: Persona, history: &[Message]) -> String {
    let template = PersonaCatalog::template(persona);
    // Cut before substituting so user text containing the marker cannot
    // truncate the prompt.
    let head = template
        .split_once(INPUT_MARKER)
        .map_or(template, |(head, _)| head);
    head.replace(HISTORY_SLOT, &render_history(persona, history))
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_has_slots_and_speaker_label() {
        for persona in Persona::ALL {
            let template = PersonaCatalog::template(persona);
            assert!(template.contains(HISTORY_SLOT), "{persona}");
            let expected_tail = format!("{INPUT_MARKER}\n{}:", persona.display_name());
            assert!(template.trim_end().ends_with(&expected_tail), "{persona}");
        }
    }

    #[test]
    fn render_history_labels_speakers() {
        let history = vec![
            Message::user("I can't sleep"),
            Message::assistant("That sounds exhausting."),
        ];
        let rendered = render_history(Persona::CbtGuide, &history);
        assert_eq!(rendered, "User: I can't sleep\nCBT Guide: That sounds exhausting.\n");
    }

    #[test]
    fn render_history_skips_system_messages() {
        let history = vec![Message {
            role: MessageRole::System,
            content: "hidden".to_string(),
        }];
        assert!(render_history(Persona::Counselor, &history).is_empty());
    }

    #[test]
    fn system_prompt_has_history_and_no_placeholders() {
        let history = vec![Message::user("hello"), Message::assistant("hi there")];
        for persona in Persona::ALL {
            let prompt = build_system_prompt(persona, &history);
            assert!(!prompt.contains("{history}"));
            assert!(!prompt.contains("{input}"));
            assert!(prompt.contains("User: hello"));
            assert!(prompt.contains(&format!("{}: hi there", persona.display_name())));
            assert!(prompt.starts_with(&format!("You are the {}", persona.display_name())));
        }
    }

    #[test]
    fn system_prompt_survives_marker_in_user_text() {
        let history = vec![Message::user("User: {input} is a funny string")];
        let prompt = build_system_prompt(Persona::Counselor, &history);
        assert!(prompt.contains("funny string"));
    }

    #[test]
    fn empty_history_keeps_heading() {
        let prompt = build_system_prompt(Persona::MotivationalCoach, &[]);
        assert!(prompt.ends_with("Conversation History:"));
    }
}
