//! CLI command definitions and dispatch for the `haven` binary.
//!
//! Uses clap derive macros for argument parsing. Commands that act on a
//! user's data take the username and prompt for the password.

pub mod account;
pub mod analytics;
pub mod chat;
pub mod persona;
pub mod session;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use uuid::Uuid;

use haven_types::persona::Persona;

/// A mental health chat companion.
#[derive(Parser)]
#[command(name = "haven", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to `server.port` in config.toml).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to `server.host` in config.toml).
        #[arg(long)]
        host: Option<String>,

        /// Export spans to stdout through OpenTelemetry.
        #[arg(long)]
        otel: bool,
    },

    /// Create an account.
    Register {
        username: String,
    },

    /// List the companion personas.
    Personas,

    /// List your chat sessions.
    #[command(alias = "ls")]
    Sessions {
        username: String,
    },

    /// Chat with the companion in the terminal.
    Chat {
        username: String,

        /// Continue an existing session instead of starting a new one.
        #[arg(long)]
        session: Option<Uuid>,

        /// Persona to start with (counselor, listener, coach, cbt).
        #[arg(long, default_value = "counselor", value_parser = parse_persona)]
        persona: Persona,
    },

    /// Export a session transcript as Markdown (or JSON with --json).
    Export {
        username: String,
        session_id: Uuid,
    },

    /// Mental health analytics for one session or all of your sessions.
    Analyze {
        username: String,

        /// Analyze only this session.
        #[arg(long)]
        session: Option<Uuid>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Write the completion script for `shell`.
pub fn write_completions(shell: Shell, out: &mut dyn std::io::Write) {
    let mut cmd = <Cli as clap::CommandFactory>::command();
    clap_complete::generate(shell, &mut cmd, "haven", out);
}

fn parse_persona(s: &str) -> Result<Persona, String> {
    s.parse::<Persona>()
}
