//! Shared helpers for command handlers.

use std::io::{self, BufRead, IsTerminal};

use dialoguer::Input;
use secrecy::SecretString;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)?;
    Ok(confirmed)
}

pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Free-text prompt. Empty answers are allowed so form validation can
/// report what is missing.
pub fn prompt_text(label: &str, default: Option<String>) -> Result<String, CliError> {
    let mut input = Input::<String>::new().with_prompt(label).allow_empty(true);
    if let Some(default) = default {
        input = input.default(default);
    }
    input.interact_text().map_err(prompt_err)
}

/// Free-text prompt pre-filled with `initial`, editable in place.
pub fn prompt_prefilled(label: &str, initial: &str) -> Result<String, CliError> {
    Input::<String>::new()
        .with_prompt(label)
        .allow_empty(true)
        .with_initial_text(initial)
        .interact_text()
        .map_err(prompt_err)
}

/// Read a password from the terminal, or the first line of stdin.
pub fn read_password(from_stdin: bool) -> Result<SecretString, CliError> {
    if from_stdin {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        let trimmed = line.trim_end_matches(['\r', '\n']).to_owned();
        return Ok(SecretString::from(trimmed));
    }
    let pass = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    Ok(SecretString::from(pass))
}

/// Take a flag value or ask for it.
pub fn value_or_prompt(
    value: Option<String>,
    label: &str,
    default: Option<String>,
) -> Result<String, CliError> {
    match value {
        Some(v) => Ok(v),
        None => prompt_text(label, default),
    }
}
