//! Application context for the Vault CLI.
//!
//! Provides a unified context that combines CLI arguments with the
//! lazily-loaded config and vault.

use std::path::Path;
use std::sync::Arc;

use chrono::Duration;
use once_cell::unsync::OnceCell;
use tracing::debug;

use vault_core::{CredentialHasher, SessionClaims, SessionTokenCodec, SqliteStorage, Vault};

use crate::cli::Cli;
use crate::config::VaultConfig;
use crate::errors::CliError;
use crate::security::read_secret_file;

use super::resolver::{load_config, session_token_path};

/// Application context that bundles CLI args with config and storage.
///
/// Config and vault are opened on first use, so commands that need neither
/// (completions, logout) never touch the filesystem.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<VaultConfig>,
    vault: OnceCell<Vault<SqliteStorage>>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
            vault: OnceCell::new(),
        }
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Get the config, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&VaultConfig> {
        self.config.get_or_try_init(load_config)
    }

    /// Get the vault, opening the database lazily if needed.
    pub fn vault(&self) -> anyhow::Result<&Vault<SqliteStorage>> {
        self.vault.get_or_try_init(|| open_vault(self.config()?))
    }

    /// Verify the stored session token and return its claims.
    pub fn claims(&self) -> anyhow::Result<SessionClaims> {
        let path = session_token_path()?;
        if !path.exists() {
            return Err(CliError::auth_failed_with_hint(
                "Not logged in",
                "Hint: Run `vault login --login <LOGIN>`.",
            )
            .into());
        }
        let token = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read session {}: {}", path.display(), e))?;
        self.vault()?.authorize(token.trim()).map_err(|err| {
            debug!(error = %err, "Stored session rejected");
            CliError::auth_failed_with_hint(
                err.client_message(),
                "Hint: Your session may have expired. Run `vault login --login <LOGIN>`.",
            )
            .into()
        })
    }
}

fn open_vault(config: &VaultConfig) -> anyhow::Result<Vault<SqliteStorage>> {
    let secret = read_secret_file(Path::new(&config.session.secret_path))?;
    if config.session.ttl_hours <= 0 {
        return Err(CliError::invalid_input("session.ttl_hours must be positive").into());
    }
    let codec = SessionTokenCodec::new(&secret)?.with_ttl(Duration::hours(config.session.ttl_hours));
    let hasher = CredentialHasher::with_params(
        config.security.argon2_memory_kib,
        config.security.argon2_iterations,
        config.security.argon2_parallelism,
    )?;

    let database = Path::new(&config.storage.path);
    if !database.exists() {
        return Err(CliError::not_found(
            format!("No vault database at {}", database.display()),
            "Hint: Run `vault init` or fix [storage] path in the config.",
        )
        .into());
    }
    let storage = SqliteStorage::open(database)?;
    Ok(Vault::with_hasher(Arc::new(storage), codec, hasher))
}
