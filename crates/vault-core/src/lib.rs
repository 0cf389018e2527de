//! # Vault Core
//!
//! Core library for Vault - a personal secret store where every record is
//! encrypted under a key unique to its owner.
//!
//! This crate provides identity, sessions, record encryption and the storage
//! abstractions, independent of any front end.
//!
//! ## Architecture
//!
//! - **crypto**: field cipher, per-user keys, password hashing
//! - **session**: stateless signed session tokens
//! - **identity**: registration and authentication
//! - **records**: text, binary and card records behind one generic service
//! - **storage**: storage traits plus SQLite and in-memory backends
//! - **vault**: facade tying the above together
//!
//! ## Flow
//!
//! Registration generates a key, a session token carries it, and every record
//! call uses the verified token's user id for ownership and its key for
//! encryption.

pub mod crypto;
pub mod error;
pub mod identity;
pub mod records;
pub mod session;
pub mod storage;
pub mod vault;

pub use crypto::{CredentialHasher, EncryptionKey};
pub use error::{ErrorKind, Result, VaultError};
pub use identity::{IdentityRegistry, MetricsSnapshot, Registration, RegistryMetrics};
pub use records::{
    parse_record_id, Binary, BinaryPayload, BinaryReceipt, BinaryView, Card, CardPayload,
    CardReceipt, CardView, RecordKind, RecordService, Text, TextPayload, TextReceipt, TextView,
};
pub use session::{SessionClaims, SessionTokenCodec};
pub use storage::{MemoryStorage, SqliteStorage, StorageEngine};
pub use vault::{Session, Vault};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
