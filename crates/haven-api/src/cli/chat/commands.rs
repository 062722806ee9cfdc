//! Slash command parsing and execution for the chat loop.
//!
//! Commands start with `/` and provide in-chat controls for sessions and
//! personas.

use console::style;

use haven_types::persona::Persona;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Exit the chat.
    Quit,
    /// Start a new session.
    New,
    /// Switch persona.
    Persona(Persona),
    /// List personas (`/persona` without an argument).
    ListPersonas,
    /// Rename the current session.
    Rename(String),
    /// Show the conversation so far.
    History,
    /// Unknown or malformed command, with a hint.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match trimmed.split_once(' ') {
        Some((cmd, arg)) => (cmd.to_lowercase(), arg.trim()),
        None => (trimmed.to_lowercase(), ""),
    };

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/quit" | "/exit" | "/q" => ChatCommand::Quit,
        "/new" => ChatCommand::New,
        "/history" => ChatCommand::History,
        "/persona" | "/p" if arg.is_empty() => ChatCommand::ListPersonas,
        "/persona" | "/p" => match arg.parse::<Persona>() {
            Ok(persona) => ChatCommand::Persona(persona),
            Err(e) => ChatCommand::Unknown(e),
        },
        "/rename" if arg.is_empty() => ChatCommand::Unknown("/rename requires a name".to_string()),
        "/rename" => ChatCommand::Rename(arg.to_string()),
        other => ChatCommand::Unknown(format!("unknown command: {other}")),
    };
    Some(command)
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}              Show this help message", style("/help").cyan());
    println!("  {}               Start a new session", style("/new").cyan());
    println!("  {}   Switch persona (no argument lists them)", style("/persona <slug>").cyan());
    println!("  {}    Rename this session", style("/rename <name>").cyan());
    println!("  {}           Show this session so far", style("/history").cyan());
    println!("  {}              Leave the chat", style("/quit").cyan());
    println!();
}

/// Print the personas with their slugs.
pub fn print_personas(current: Persona) {
    println!();
    for persona in Persona::ALL {
        let marker = if persona == current { "*" } else { " " };
        println!(
            "  {} {:<9} {}",
            style(marker).green().bold(),
            style(persona.slug()).yellow(),
            persona.display_name()
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse("hello there"), None);
        assert_eq!(parse("  not /a command"), None);
    }

    #[test]
    fn quit_aliases() {
        for input in ["/quit", "/exit", "/q", "  /QUIT  "] {
            assert_eq!(parse(input), Some(ChatCommand::Quit));
        }
    }

    #[test]
    fn persona_switch() {
        assert_eq!(parse("/persona coach"), Some(ChatCommand::Persona(Persona::MotivationalCoach)));
        assert_eq!(
            parse("/persona Compassionate Listener"),
            Some(ChatCommand::Persona(Persona::CompassionateListener))
        );
        assert_eq!(parse("/persona"), Some(ChatCommand::ListPersonas));
        assert!(matches!(parse("/persona pirate"), Some(ChatCommand::Unknown(_))));
    }

    #[test]
    fn rename_keeps_spaces() {
        assert_eq!(
            parse("/rename  Exam week  "),
            Some(ChatCommand::Rename("Exam week".to_string()))
        );
        assert!(matches!(parse("/rename"), Some(ChatCommand::Unknown(_))));
    }

    #[test]
    fn unknown_command() {
        assert!(matches!(parse("/dance"), Some(ChatCommand::Unknown(_))));
    }
}
