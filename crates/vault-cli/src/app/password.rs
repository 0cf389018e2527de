//! Password and secret prompts.

use std::io::{IsTerminal, Read};

use dialoguer::Password;
use secrecy::SecretString;
use zeroize::Zeroizing;

use crate::constants::env;
use crate::errors::CliError;

/// Read the account password from `VAULT_PASSWORD` or an interactive prompt.
///
/// With `confirm`, the prompt asks twice (used at registration).
pub fn read_password(confirm: bool) -> anyhow::Result<SecretString> {
    if let Ok(value) = std::env::var(env::PASSWORD) {
        if !value.is_empty() {
            return Ok(SecretString::from(value));
        }
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::invalid_input(format!(
            "No password provided and no TTY available. Set {}.",
            env::PASSWORD
        ))
        .into());
    }

    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    let value = prompt
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))?;
    Ok(SecretString::from(value))
}

/// Card number and CVV entered by the user.
pub struct CardSecrets {
    pub number: String,
    pub cvv: String,
}

/// Read a card number and CVV.
///
/// On a terminal both are prompted for without echo. Otherwise stdin must
/// hold the number on the first line and the CVV on the second.
pub fn read_card_secrets() -> anyhow::Result<CardSecrets> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(CardSecrets {
            number: prompt_hidden("Card number")?,
            cvv: prompt_hidden("CVV")?,
        });
    }

    let mut input = Zeroizing::new(String::new());
    stdin
        .read_to_string(&mut input)
        .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
    let mut lines = input.lines().map(str::trim).filter(|line| !line.is_empty());
    match (lines.next(), lines.next()) {
        (Some(number), Some(cvv)) => Ok(CardSecrets {
            number: number.to_string(),
            cvv: cvv.to_string(),
        }),
        _ => Err(CliError::invalid_input(
            "Expected the card number and CVV on stdin, one per line",
        )
        .into()),
    }
}

fn prompt_hidden(label: &str) -> anyhow::Result<String> {
    Password::new()
        .with_prompt(label)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", label, e))
}
