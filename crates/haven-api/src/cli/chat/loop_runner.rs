//! Main chat loop orchestration.
//!
//! Logs the user in, opens or resumes a session, then reads lines from
//! stdin: slash commands are handled locally, everything else is streamed
//! through the chat service and printed as it arrives.

use std::io::Write;
use std::time::Duration;

use anyhow::{Result, bail};
use console::style;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use haven_core::chat::service::ChatStreamEvent;
use haven_types::chat::{ChatMessage, ChatSession, MessageRole};
use haven_types::persona::Persona;
use haven_types::user::User;

use crate::cli::account;
use crate::state::AppState;

use super::commands::{self, ChatCommand};

/// Spinner shown until the first token arrives.
pub(crate) fn thinking_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn print_banner(session: &ChatSession, persona: Persona) {
    println!();
    println!(
        "  {} {}",
        style("Haven").magenta().bold(),
        style("a safe space to talk").dim()
    );
    println!(
        "  Session {} with {}",
        style(&session.name).cyan(),
        style(persona.display_name()).green()
    );
    println!(
        "  {}",
        style("Type /help for commands, /quit to leave.").dim()
    );
    println!();
}

fn print_history(messages: &[ChatMessage]) {
    if messages.is_empty() {
        println!("\n  {}\n", style("No messages yet.").dim());
        return;
    }
    println!();
    for msg in messages {
        let label = match (msg.role, msg.persona) {
            (MessageRole::User, _) => style("You".to_string()).green().bold(),
            (_, Some(persona)) => style(persona.display_name().to_string()).cyan().bold(),
            (_, None) => style("Companion".to_string()).cyan().bold(),
        };
        println!("  {label} {}", msg.content);
    }
    println!();
}

/// Run the interactive chat loop for `username`.
pub async fn run_chat_loop(
    state: &AppState,
    username: &str,
    resume: Option<Uuid>,
    mut persona: Persona,
) -> Result<()> {
    if let Some(reason) = &state.chat_unavailable {
        bail!("Chat is not available: {reason}");
    }

    let user = account::login(state, username).await?;
    let mut session = match resume {
        Some(id) => state.chat_service.get_session(&user, &id).await?,
        None => state.chat_service.create_session(&user, None).await?,
    };

    print_banner(&session, persona);
    if resume.is_some() {
        let history = state.chat_service.load_history(&user, &session.id).await?;
        print_history(&history);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  {} ", style("You >").green().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!("\n  {}", style("Take care. Session saved.").dim());
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        if let Some(cmd) = commands::parse(text) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Quit => {
                    println!("\n  {}", style("Take care. Session saved.").dim());
                    break;
                }
                ChatCommand::New => {
                    session = state.chat_service.create_session(&user, None).await?;
                    print_banner(&session, persona);
                }
                ChatCommand::Persona(next) => {
                    persona = next;
                    println!("\n  Now talking with {}\n", style(persona.display_name()).green());
                }
                ChatCommand::ListPersonas => commands::print_personas(persona),
                ChatCommand::Rename(name) => {
                    match state.chat_service.rename_session(&user, &session.id, &name).await {
                        Ok(renamed) => {
                            session = renamed;
                            println!("\n  {} Session renamed to {}\n", style("✓").green(), style(&session.name).cyan());
                        }
                        Err(e) => println!("\n  {} {e}\n", style("!").red().bold()),
                    }
                }
                ChatCommand::History => {
                    let history = state.chat_service.load_history(&user, &session.id).await?;
                    print_history(&history);
                }
                ChatCommand::Unknown(hint) => {
                    println!(
                        "\n  {} {hint}. Type /help for available commands.\n",
                        style("?").yellow().bold()
                    );
                }
            }
            continue;
        }

        send_and_print(state, &user, &session, persona, text).await;
    }

    Ok(())
}

/// Stream one reply to the terminal. Errors are printed, not returned, so
/// the loop keeps going.
async fn send_and_print(state: &AppState, user: &User, session: &ChatSession, persona: Persona, text: &str) {
    let spinner = thinking_spinner("thinking...");

    let mut events = match state
        .chat_service
        .stream_message(user, &session.id, text, persona)
        .await
    {
        Ok(events) => events,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("\n  {} {e}\n", style("!").red().bold());
            return;
        }
    };

    let mut first_token = true;
    while let Some(event) = events.next().await {
        match event {
            Ok(ChatStreamEvent::TextDelta { text: delta }) => {
                if first_token {
                    spinner.finish_and_clear();
                    first_token = false;
                    print!("\n  {} ", style(persona.display_name()).cyan().bold());
                }
                print!("{delta}");
                let _ = std::io::stdout().flush();
            }
            Ok(ChatStreamEvent::Message { message }) => {
                spinner.finish_and_clear();
                println!();
                let mut footer = Vec::new();
                if let Some(tokens) = message.output_tokens.filter(|t| *t > 0) {
                    footer.push(format!("{tokens} tokens"));
                }
                if let Some(ms) = message.response_ms {
                    footer.push(format!("{:.1}s", ms as f64 / 1000.0));
                }
                if !footer.is_empty() {
                    println!("  {}", style(footer.join(" | ")).dim());
                }
                println!();
            }
            Err(e) => {
                spinner.finish_and_clear();
                eprintln!("\n  {} {e}", style("!").red().bold());
                eprintln!("  {}\n", style("Nothing was saved. Send the message again to retry.").dim());
                break;
            }
        }
    }
}
