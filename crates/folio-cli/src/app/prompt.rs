//! Secret entry and confirmation prompts.

use std::io::IsTerminal;

use dialoguer::{Confirm, Password};
use folio_core::session::CredentialPrompt;

use crate::constants::SECRET_ENV;

/// Credential prompt for gated commands run without a session.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn request_credentials(&self) {
        eprintln!("Login required. Run `folio login` to start a session.");
    }
}

/// Read the secret from FOLIO_SECRET, or prompt for it.
pub fn read_secret(no_input: bool, prompt: &str) -> anyhow::Result<String> {
    if let Ok(value) = std::env::var(SECRET_ENV) {
        if !value.trim().is_empty() {
            return Ok(value);
        }
    }
    if no_input || !std::io::stdin().is_terminal() {
        return Err(anyhow::anyhow!(
            "No secret provided and no TTY available. Set {}.",
            SECRET_ENV
        ));
    }
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read secret: {}", e))
}

/// Take a new secret from the argument, or prompt twice for it.
pub fn read_new_secret(value: Option<&str>, no_input: bool) -> anyhow::Result<String> {
    if let Some(value) = value {
        return Ok(value.to_string());
    }
    if no_input || !std::io::stdin().is_terminal() {
        return Err(anyhow::anyhow!("No secret provided and no TTY available."));
    }
    Password::new()
        .with_prompt("New secret")
        .with_confirmation("Confirm secret", "Secrets do not match")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read secret: {}", e))
}

/// Ask before a destructive action.
///
/// Skipped (answering yes) with `--yes`, in quiet mode, or when stdin is
/// not a terminal.
pub fn confirm_action(assume_yes: bool, quiet: bool, question: &str) -> anyhow::Result<bool> {
    if assume_yes || quiet || !std::io::stdin().is_terminal() {
        return Ok(true);
    }
    let proceed = Confirm::new()
        .with_prompt(question)
        .default(false)
        .interact()?;
    Ok(proceed)
}
