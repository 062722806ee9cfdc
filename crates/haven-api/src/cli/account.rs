//! Account commands and the password prompt shared by user-scoped commands.

use anyhow::{Context, Result};
use console::style;
use dialoguer::Password;

use haven_types::user::{MIN_PASSWORD_LEN, User};

use crate::state::AppState;

/// Create an account, prompting for the password twice.
///
/// # Examples
///
/// ```bash
/// haven register mira
/// ```
pub async fn register(state: &AppState, username: &str, json: bool) -> Result<()> {
    let password = Password::new()
        .with_prompt(format!("Choose a password (at least {MIN_PASSWORD_LEN} characters)"))
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()
        .context("Failed to read password")?;

    let user = state.auth_service.register(username, &password).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        println!();
        println!(
            "  {} Account '{}' created. Start chatting with: {}",
            style("✓").green().bold(),
            style(&user.username).cyan(),
            style(format!("haven chat {}", user.username)).yellow()
        );
        println!();
    }

    Ok(())
}

/// Prompt for `username`'s password and return the verified user.
pub async fn login(state: &AppState, username: &str) -> Result<User> {
    let password = Password::new()
        .with_prompt(format!("Password for {username}"))
        .interact()
        .context("Failed to read password")?;

    Ok(state
        .auth_service
        .verify_credentials(username, &password)
        .await?)
}
