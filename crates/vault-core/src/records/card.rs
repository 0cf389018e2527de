//! Payment card records.
//!
//! Card number and CVV are encrypted. Cardholder name and expiration date
//! are stored in plaintext and echoed back on create.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{
    mask_card_number, normalize_card_number, validate_cardholder_name, validate_cvv,
    validate_expiration_date,
};
use super::RecordKind;
use crate::crypto::{decrypt_string, encrypt, EncryptionKey};
use crate::error::Result;
use crate::storage::{CardRecord, NewCardRecord};

/// Card record kind.
pub enum Card {}

/// Plaintext card input.
#[derive(Clone, Serialize, Deserialize)]
pub struct CardPayload {
    pub card_number: String,
    pub cardholder_name: String,
    pub expiration_date: String,
    pub cvv: String,
}

impl std::fmt::Debug for CardPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardPayload")
            .field("card_number", &mask_card_number(&self.card_number))
            .field("cardholder_name", &self.cardholder_name)
            .field("expiration_date", &self.expiration_date)
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

/// Decrypted card.
#[derive(Clone, Serialize)]
pub struct CardView {
    pub id: Uuid,
    pub card_number: String,
    pub cardholder_name: String,
    pub expiration_date: String,
    pub cvv: String,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for CardView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardView")
            .field("id", &self.id)
            .field("card_number", &mask_card_number(&self.card_number))
            .field("cardholder_name", &self.cardholder_name)
            .field("expiration_date", &self.expiration_date)
            .field("cvv", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Result of creating a card record. Never carries the number or CVV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardReceipt {
    pub id: Uuid,
    pub cardholder_name: String,
    pub expiration_date: String,
    pub created_at: DateTime<Utc>,
}

impl RecordKind for Card {
    const NAME: &'static str = "card";
    const SENSITIVE_FIELDS: &'static [&'static str] = &["card_number", "cvv"];

    type Payload = CardPayload;
    type Sealed = NewCardRecord;
    type Stored = CardRecord;
    type View = CardView;
    type Receipt = CardReceipt;

    fn seal(payload: CardPayload, owner_id: Uuid, key: &EncryptionKey) -> Result<NewCardRecord> {
        let number = normalize_card_number(&payload.card_number)?;
        validate_cardholder_name(&payload.cardholder_name)?;
        validate_expiration_date(&payload.expiration_date)?;
        validate_cvv(&payload.cvv)?;

        Ok(NewCardRecord {
            owner_id,
            cipher_card_number: encrypt(number.as_bytes(), key.as_bytes())?,
            cardholder_name: payload.cardholder_name,
            expiration_date: payload.expiration_date,
            cipher_cvv: encrypt(payload.cvv.as_bytes(), key.as_bytes())?,
            created_at: Utc::now(),
        })
    }

    fn receipt(id: Uuid, sealed: &NewCardRecord) -> CardReceipt {
        CardReceipt {
            id,
            cardholder_name: sealed.cardholder_name.clone(),
            expiration_date: sealed.expiration_date.clone(),
            created_at: sealed.created_at,
        }
    }

    fn open(stored: CardRecord, key: &EncryptionKey) -> Result<CardView> {
        Ok(CardView {
            id: stored.id,
            card_number: decrypt_string(&stored.cipher_card_number, key.as_bytes())?,
            cardholder_name: stored.cardholder_name,
            expiration_date: stored.expiration_date,
            cvv: decrypt_string(&stored.cipher_cvv, key.as_bytes())?,
            created_at: stored.created_at,
        })
    }
}
