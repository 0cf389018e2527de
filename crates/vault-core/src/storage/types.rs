//! Row types exchanged with storage backends.
//!
//! Record rows only ever hold ciphertext for sensitive fields. The user's
//! encryption key lives in the user row and nowhere else in storage.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::crypto::EncryptionKey;

/// A registered user.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique identifier, assigned by storage
    pub id: Uuid,

    /// Unique login name
    pub login: String,

    /// Argon2id PHC string
    pub password_hash: String,

    /// Record encryption key, generated once at registration
    pub encryption_key: EncryptionKey,

    /// When this user registered
    pub created_at: DateTime<Utc>,
}

/// A user about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub password_hash: String,
    pub encryption_key: EncryptionKey,
}

/// A stored text record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub cipher_text: String,
}

/// A text record about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTextRecord {
    pub owner_id: Uuid,
    pub cipher_text: String,
}

/// A stored binary record.
///
/// `cipher_blob` is the ciphertext of the base64 text of the original bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub filename: String,
    pub cipher_blob: String,
}

/// A binary record about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBinaryRecord {
    pub owner_id: Uuid,
    pub filename: String,
    pub cipher_blob: String,
}

/// A stored payment card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub cipher_card_number: String,
    pub cardholder_name: String,
    pub expiration_date: String,
    pub cipher_cvv: String,
    pub created_at: DateTime<Utc>,
}

/// A payment card about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCardRecord {
    pub owner_id: Uuid,
    pub cipher_card_number: String,
    pub cardholder_name: String,
    pub expiration_date: String,
    pub cipher_cvv: String,

    /// Stamped when the card is sealed; stored as given
    pub created_at: DateTime<Utc>,
}
