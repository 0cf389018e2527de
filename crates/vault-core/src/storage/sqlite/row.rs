//! Raw row types for database queries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::crypto::EncryptionKey;
use crate::error::{Result, VaultError};
use crate::storage::types::{BinaryRecord, CardRecord, TextRecord, User};

fn parse_uuid(value: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| VaultError::Storage(format!("Invalid {} UUID: {}", what, e)))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| VaultError::Storage(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}

/// Raw row data from the users table.
pub struct UserRow {
    pub id: String,
    pub login: String,
    pub password_hash: String,
    pub encryption_key: String,
    pub created_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = VaultError;

    fn try_from(row: UserRow) -> Result<Self> {
        // A bad stored key is a storage fault, not caller input.
        let encryption_key = EncryptionKey::from_base64(&row.encryption_key)
            .map_err(|e| VaultError::Storage(format!("Invalid stored key: {}", e)))?;

        Ok(User {
            id: parse_uuid(&row.id, "user")?,
            login: row.login,
            password_hash: row.password_hash,
            encryption_key,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

/// Raw row data from the text_records table.
#[derive(Debug)]
pub struct TextRow {
    pub id: String,
    pub owner_id: String,
    pub cipher_text: String,
}

impl TryFrom<TextRow> for TextRecord {
    type Error = VaultError;

    fn try_from(row: TextRow) -> Result<Self> {
        Ok(TextRecord {
            id: parse_uuid(&row.id, "record")?,
            owner_id: parse_uuid(&row.owner_id, "owner")?,
            cipher_text: row.cipher_text,
        })
    }
}

/// Raw row data from the binary_records table.
#[derive(Debug)]
pub struct BinaryRow {
    pub id: String,
    pub owner_id: String,
    pub filename: String,
    pub cipher_blob: String,
}

impl TryFrom<BinaryRow> for BinaryRecord {
    type Error = VaultError;

    fn try_from(row: BinaryRow) -> Result<Self> {
        Ok(BinaryRecord {
            id: parse_uuid(&row.id, "record")?,
            owner_id: parse_uuid(&row.owner_id, "owner")?,
            filename: row.filename,
            cipher_blob: row.cipher_blob,
        })
    }
}

/// Raw row data from the card_records table.
#[derive(Debug)]
pub struct CardRow {
    pub id: String,
    pub owner_id: String,
    pub cipher_card_number: String,
    pub cardholder_name: String,
    pub expiration_date: String,
    pub cipher_cvv: String,
    pub created_at: String,
}

impl TryFrom<CardRow> for CardRecord {
    type Error = VaultError;

    fn try_from(row: CardRow) -> Result<Self> {
        Ok(CardRecord {
            id: parse_uuid(&row.id, "record")?,
            owner_id: parse_uuid(&row.owner_id, "owner")?,
            cipher_card_number: row.cipher_card_number,
            cardholder_name: row.cardholder_name,
            expiration_date: row.expiration_date,
            cipher_cvv: row.cipher_cvv,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}
