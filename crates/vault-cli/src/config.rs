use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vault_core::crypto::password::{DEFAULT_ITERATIONS, DEFAULT_MEMORY_KIB, DEFAULT_PARALLELISM};
use vault_core::session::DEFAULT_TOKEN_TTL_HOURS;

#[derive(Debug, Serialize, Deserialize)]
pub struct VaultConfig {
    pub storage: StorageSection,
    pub session: SessionSection,
    #[serde(default)]
    pub security: SecuritySection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StorageSection {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSection {
    pub secret_path: String,
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SecuritySection {
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            argon2_memory_kib: DEFAULT_MEMORY_KIB,
            argon2_iterations: DEFAULT_ITERATIONS,
            argon2_parallelism: DEFAULT_PARALLELISM,
        }
    }
}

fn default_ttl_hours() -> i64 {
    DEFAULT_TOKEN_TTL_HOURS
}

impl VaultConfig {
    pub fn new(database_path: &Path, secret_path: &Path, ttl_hours: i64) -> Self {
        Self {
            storage: StorageSection {
                path: database_path.to_string_lossy().to_string(),
            },
            session: SessionSection {
                secret_path: secret_path.to_string_lossy().to_string(),
                ttl_hours,
            },
            security: SecuritySection::default(),
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_database_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("vault.db"))
}

pub fn default_secret_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("session.secret"))
}

pub fn read_config(path: &Path) -> anyhow::Result<VaultConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &VaultConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("vault"));
        }
    }
    Ok(home_dir()?.join(".config").join("vault"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("vault"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("vault"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
