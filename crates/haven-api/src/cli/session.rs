//! Session CLI commands: list and export.
//!
//! Provides session browsing with rich tables and Markdown/JSON export.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use uuid::Uuid;

use haven_types::chat::{ChatMessage, ChatSession, MessageRole};

use crate::cli::account;
use crate::state::AppState;

/// List a user's sessions, newest first.
///
/// # Examples
///
/// ```bash
/// haven sessions mira
/// haven sessions mira --json
/// ```
pub async fn list_sessions(state: &AppState, username: &str, json: bool) -> Result<()> {
    let user = account::login(state, username).await?;
    let sessions = state.chat_service.list_sessions(&user).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No sessions yet. Start one with: {}",
            style("i").blue().bold(),
            style(format!("haven chat {}", user.username)).yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Created").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    for session in &sessions {
        table.add_row(vec![
            Cell::new(truncate(&session.name, 40)).fg(Color::Cyan),
            Cell::new(session.created_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(session.message_count.to_string()),
            Cell::new(session.id.to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("  Sessions for '{}'", style(&user.username).cyan().bold());
    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{}",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Export a session as Markdown (default) or JSON.
///
/// # Examples
///
/// ```bash
/// haven export mira <session-id>
/// haven export mira <session-id> --json > chat.json
/// ```
pub async fn export_session(
    state: &AppState,
    username: &str,
    session_id: Uuid,
    json: bool,
) -> Result<()> {
    let user = account::login(state, username).await?;
    let session = state.chat_service.get_session(&user, &session_id).await?;
    let messages = state.chat_service.load_history(&user, &session_id).await?;

    if json {
        let export = serde_json::json!({
            "session": session,
            "messages": messages,
        });
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    print!("{}", render_markdown(&session, &messages));
    Ok(())
}

/// Markdown transcript of a session.
pub fn render_markdown(session: &ChatSession, messages: &[ChatMessage]) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", session.name));
    out.push_str(&format!(
        "- **Created:** {}\n",
        session.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    out.push_str(&format!("- **Messages:** {}\n\n---\n\n", messages.len()));

    for msg in messages {
        let role_label = match (msg.role, msg.persona) {
            (MessageRole::User, _) => "**You**".to_string(),
            (MessageRole::Assistant, Some(persona)) => format!("**{}**", persona.display_name()),
            (MessageRole::Assistant, None) => "**Assistant**".to_string(),
            (MessageRole::System, _) => "**System**".to_string(),
        };
        out.push_str(&format!(
            "### {role_label} ({})\n\n{}\n\n",
            msg.created_at.format("%H:%M"),
            msg.content
        ));
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use haven_types::persona::Persona;

    fn message(role: MessageRole, content: &str, persona: Option<Persona>) -> ChatMessage {
        ChatMessage {
            id: Uuid::now_v7(),
            session_id: Uuid::nil(),
            role,
            content: content.to_string(),
            persona,
            created_at: Utc::now(),
            input_tokens: None,
            output_tokens: None,
            model: None,
            response_ms: None,
        }
    }

    #[test]
    fn markdown_labels_speakers() {
        let session = ChatSession {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            name: "Exam stress".to_string(),
            created_at: Utc::now(),
            message_count: 2,
        };
        let messages = vec![
            message(MessageRole::User, "I can't focus", None),
            message(MessageRole::Assistant, "Let's look at that thought.", Some(Persona::CbtGuide)),
        ];

        let md = render_markdown(&session, &messages);
        assert!(md.starts_with("# Exam stress\n"));
        assert!(md.contains("- **Messages:** 2"));
        assert!(md.contains("### **You**"));
        assert!(md.contains("### **CBT Guide**"));
        assert!(md.contains("Let's look at that thought."));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 40), "short");
        assert_eq!(truncate("ééééééééé", 6), "ééé...");
    }
}
