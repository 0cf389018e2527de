use std::path::Path;

use tracing::info;
use vault_core::session::{DEFAULT_TOKEN_TTL_HOURS, MIN_SECRET_BYTES};
use vault_core::SqliteStorage;

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{default_database_path, default_secret_path, write_config, VaultConfig};
use crate::errors::CliError;
use crate::security::{
    ensure_parent_dir, generate_secret_bytes, read_secret_file, write_secret_file,
};

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path()?;
    if config_path.exists() {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {}",
            config_path.display()
        ))
        .into());
    }

    let ttl_hours = args.ttl_hours.unwrap_or(DEFAULT_TOKEN_TTL_HOURS);
    if ttl_hours <= 0 {
        return Err(CliError::invalid_input("--ttl-hours must be positive").into());
    }

    let database_path = match &args.database {
        Some(path) => path.clone(),
        None => default_database_path()?,
    };
    let secret_path = default_secret_path()?;

    // Database first: nothing secret is written unless storage is usable.
    ensure_parent_dir(&database_path)?;
    SqliteStorage::open(&database_path)?;

    let created_secret = prepare_secret(&secret_path)?;

    let config = VaultConfig::new(&database_path, &secret_path, ttl_hours);
    if let Err(err) = write_config(&config_path, &config) {
        if created_secret {
            let _ = std::fs::remove_file(&secret_path);
        }
        return Err(err);
    }

    if !ctx.quiet() {
        println!("Initialized vault");
        println!("  config:   {}", config_path.display());
        println!("  database: {}", database_path.display());
    }
    Ok(())
}

/// Make sure a signing secret exists at `path`.
///
/// A valid secret left by an earlier, unfinished init is kept. Returns
/// whether a new secret was written.
fn prepare_secret(path: &Path) -> anyhow::Result<bool> {
    if path.exists() {
        if read_secret_file(path).is_ok_and(|secret| secret.len() >= MIN_SECRET_BYTES) {
            info!(path = %path.display(), "Reusing existing signing secret");
            return Ok(false);
        }
        return Err(CliError::invalid_input(format!(
            "Unreadable signing secret at {}; remove it and run init again",
            path.display()
        ))
        .into());
    }
    let secret = generate_secret_bytes()?;
    write_secret_file(path, secret.as_ref())?;
    Ok(true)
}
