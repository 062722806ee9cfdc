//! Haven CLI and REST API entry point.
//!
//! Binary name: `haven`
//!
//! Parses CLI arguments, initializes database and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Provider keys may live in a .env file next to the binary's working dir.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,haven=debug",
        _ => "trace",
    };
    let otel = matches!(cli.command, Commands::Serve { otel: true, .. });
    haven_observe::tracing_setup::init_tracing(filter, otel)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let result = match cli.command {
        Commands::Completions { shell } => {
            cli::write_completions(shell, &mut std::io::stdout());
            Ok(())
        }
        Commands::Personas => cli::persona::list_personas(cli.json),
        Commands::Register { username } => {
            let state = AppState::init().await?;
            cli::account::register(&state, &username, cli.json).await
        }
        Commands::Sessions { username } => {
            let state = AppState::init().await?;
            cli::session::list_sessions(&state, &username, cli.json).await
        }
        Commands::Chat {
            username,
            session,
            persona,
        } => {
            let state = AppState::init().await?;
            cli::chat::loop_runner::run_chat_loop(&state, &username, session, persona).await
        }
        Commands::Export {
            username,
            session_id,
        } => {
            let state = AppState::init().await?;
            cli::session::export_session(&state, &username, session_id, cli.json).await
        }
        Commands::Analyze { username, session } => {
            let state = AppState::init().await?;
            cli::analytics::analyze(&state, &username, session, cli.json).await
        }
        Commands::Serve { port, host, .. } => {
            let state = AppState::init().await?;
            serve(state, host, port, cli.quiet).await
        }
    };

    haven_observe::tracing_setup::shutdown_tracing();
    result
}

async fn serve(state: AppState, host: Option<String>, port: Option<u16>, quiet: bool) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| state.config.server.host.clone());
    let port = port.unwrap_or(state.config.server.port);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(data_dir = %state.data_dir.display(), %addr, "Starting API server");
    if let Some(reason) = &state.chat_unavailable {
        tracing::warn!("Chat endpoints will fail until configured: {reason}");
    }
    if !quiet {
        println!(
            "  {} Haven API listening on {}",
            console::style("⚡").bold(),
            console::style(format!("http://{addr}")).cyan()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
