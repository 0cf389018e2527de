//! Opaque text records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::validate_text;
use super::RecordKind;
use crate::crypto::{decrypt_string, encrypt, EncryptionKey};
use crate::error::Result;
use crate::storage::{NewTextRecord, TextRecord};

/// Text record kind. The whole body is sensitive.
pub enum Text {}

/// Plaintext text record input.
#[derive(Clone, Serialize, Deserialize)]
pub struct TextPayload {
    #[serde(alias = "data")]
    pub text: String,
}

impl TextPayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl std::fmt::Debug for TextPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextPayload")
            .field("text", &"[REDACTED]")
            .finish()
    }
}

/// Decrypted text record.
#[derive(Clone, Serialize)]
pub struct TextView {
    pub id: Uuid,
    pub text: String,
}

impl std::fmt::Debug for TextView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextView")
            .field("id", &self.id)
            .field("text", &"[REDACTED]")
            .finish()
    }
}

/// Result of creating a text record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextReceipt {
    pub id: Uuid,
}

impl RecordKind for Text {
    const NAME: &'static str = "text";
    const SENSITIVE_FIELDS: &'static [&'static str] = &["text"];

    type Payload = TextPayload;
    type Sealed = NewTextRecord;
    type Stored = TextRecord;
    type View = TextView;
    type Receipt = TextReceipt;

    fn seal(payload: TextPayload, owner_id: Uuid, key: &EncryptionKey) -> Result<NewTextRecord> {
        validate_text(&payload.text)?;
        Ok(NewTextRecord {
            owner_id,
            cipher_text: encrypt(payload.text.as_bytes(), key.as_bytes())?,
        })
    }

    fn receipt(id: Uuid, _sealed: &NewTextRecord) -> TextReceipt {
        TextReceipt { id }
    }

    fn open(stored: TextRecord, key: &EncryptionKey) -> Result<TextView> {
        Ok(TextView {
            id: stored.id,
            text: decrypt_string(&stored.cipher_text, key.as_bytes())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open() {
        let key = EncryptionKey::generate().unwrap();
        let owner = Uuid::new_v4();
        let sealed = Text::seal(TextPayload::new("hello world"), owner, &key).unwrap();
        assert_eq!(sealed.owner_id, owner);

        let stored = TextRecord {
            id: Uuid::new_v4(),
            owner_id: owner,
            cipher_text: sealed.cipher_text,
        };
        assert_eq!(Text::open(stored, &key).unwrap().text, "hello world");
    }

    #[test]
    fn test_payload_accepts_data_alias() {
        let payload: TextPayload = serde_json::from_str(r#"{"data":"legacy"}"#).unwrap();
        assert_eq!(payload.text, "legacy");
    }

    #[test]
    fn test_debug_redacts() {
        let output = format!("{:?}", TextPayload::new("top secret"));
        assert!(!output.contains("top secret"));
    }
}
