//! Cryptographic operations for Vault.
//!
//! - **cipher**: AES-256-CFB field encryption with a fresh IV per value
//! - **key**: per-user 256-bit encryption keys
//! - **password**: Argon2id credential hashing
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the database (record fields are ciphertext, passwords hashed)
//!
//! We do NOT defend against:
//! - Anyone holding a session token: its payload carries the user's key
//!   in the clear, protected only by the signature against tampering
//! - Undetected ciphertext corruption (CFB has no integrity tag)

pub mod cipher;
pub mod key;
pub mod password;

pub use cipher::{decrypt, decrypt_string, encrypt, IV_LENGTH};
pub use key::{EncryptionKey, KEY_LENGTH};
pub use password::{validate_login, validate_password, CredentialHasher};
