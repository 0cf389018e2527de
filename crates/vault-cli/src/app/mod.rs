//! Application-level utilities for the Vault CLI.
//!
//! This module provides:
//! - Path resolution for config and session files
//! - The lazily-opened application context
//! - Password and card secret prompting

mod context;
mod password;
mod resolver;

// Re-export public API
pub use context::AppContext;
pub use password::{read_card_secrets, read_password};
pub use resolver::{resolve_config_path, session_token_path};
