//! Path resolution for config, database and session files.

use std::path::{Path, PathBuf};

use crate::config::{default_config_path, read_config, xdg_data_dir, VaultConfig};
use crate::constants::{env, SESSION_TOKEN_FILE};
use crate::errors::CliError;

/// Resolve the config file path, checking VAULT_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(env::CONFIG) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Load the config, failing with a `vault init` hint when it is missing.
pub fn load_config() -> anyhow::Result<VaultConfig> {
    let config_path = resolve_config_path()?;
    if !config_path.exists() {
        return Err(CliError::not_found(
            missing_config_message(&config_path),
            "Hint: Run `vault init` first.",
        )
        .into());
    }
    read_config(&config_path)
}

/// Where the current session token is kept.
pub fn session_token_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join(SESSION_TOKEN_FILE))
}

/// Error message when config file is missing.
pub fn missing_config_message(config_path: &Path) -> String {
    format!("No vault config found at {}", config_path.display())
}
