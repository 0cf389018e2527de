//! Error types for Vault core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; `kind()` groups them into the
//! categories a transport layer reports, and `client_message()` gives the
//! text that is safe to hand back to an untrusted caller.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for Vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Core error type for Vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Key length does not match the cipher's key size
    #[error("Invalid key: expected {expected} bytes, got {actual}")]
    InvalidKey { expected: usize, actual: usize },

    /// Ciphertext could not be decoded or is shorter than one IV
    #[error("Malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// Session token signature does not match the server secret
    #[error("Session token signature is invalid")]
    InvalidSignature,

    /// Session token is past its expiry
    #[error("Session token has expired")]
    TokenExpired,

    /// Session token cannot be parsed
    #[error("Malformed session token: {0}")]
    MalformedToken(String),

    /// Unknown login or wrong password
    #[error("Invalid login or password")]
    InvalidCredentials,

    /// Login is already registered
    #[error("Login already registered: {0}")]
    DuplicateLogin(String),

    /// Record absent, or owned by another user
    #[error("Record not found: {0}")]
    RecordNotFound(Uuid),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Randomness or hashing failure
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },
}

/// Coarse error categories reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed identifier, payload, key or ciphertext
    Validation,
    /// Wrong credentials or an invalid, expired or tampered token
    Auth,
    /// Login already taken
    Conflict,
    /// Record absent or not owned by the caller
    NotFound,
    /// Storage collaborator failure
    Storage,
    /// Unexpected internal failure
    Internal,
}

impl VaultError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::InvalidKey { .. }
            | VaultError::MalformedCiphertext(_)
            | VaultError::Validation(_) => ErrorKind::Validation,
            VaultError::InvalidSignature
            | VaultError::TokenExpired
            | VaultError::MalformedToken(_)
            | VaultError::InvalidCredentials => ErrorKind::Auth,
            VaultError::DuplicateLogin(_) => ErrorKind::Conflict,
            VaultError::RecordNotFound(_) => ErrorKind::NotFound,
            VaultError::Storage(_) | VaultError::Sqlite { .. } => ErrorKind::Storage,
            VaultError::Crypto(_) => ErrorKind::Internal,
        }
    }

    /// Message that is safe to return to an untrusted caller.
    ///
    /// Every authentication failure yields the same text.
    pub fn client_message(&self) -> String {
        match self.kind() {
            ErrorKind::Auth => "Authentication failed".to_string(),
            ErrorKind::Internal => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        VaultError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        VaultError::Validation(err.to_string())
    }
}
