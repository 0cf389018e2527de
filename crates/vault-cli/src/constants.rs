//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Record, config or session not found.
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong credentials, bad or expired session).
    pub const AUTH_FAILED: i32 = 5;

    /// Login already registered.
    pub const CONFLICT: i32 = 6;
}

/// Environment variables read by the CLI.
pub mod env {
    /// Config file override.
    pub const CONFIG: &str = "VAULT_CONFIG";

    /// Non-interactive password source.
    pub const PASSWORD: &str = "VAULT_PASSWORD";

    /// Log filter directives.
    pub const LOG: &str = "VAULT_LOG";
}

/// File name of the stored session token under the data directory.
pub const SESSION_TOKEN_FILE: &str = "session.token";

/// Length of a generated signing secret in bytes.
pub const SIGNING_SECRET_BYTES: usize = 32;
