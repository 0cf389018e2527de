//! Binary blob records.
//!
//! The blob is base64-encoded before encryption, so the stored value is
//! `base64url(IV || encrypt(base64(bytes)))`. The filename stays plaintext.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::validation::{validate_binary_size, validate_filename};
use super::RecordKind;
use crate::crypto::{decrypt_string, encrypt, EncryptionKey};
use crate::error::{Result, VaultError};
use crate::storage::{BinaryRecord, NewBinaryRecord};

/// Binary record kind. The data is sensitive; the filename is not.
pub enum Binary {}

/// Plaintext binary record input.
///
/// In JSON, `data` is standard base64 text.
#[derive(Clone, Serialize, Deserialize)]
pub struct BinaryPayload {
    #[serde(alias = "file_name")]
    pub filename: String,
    #[serde(with = "base64_data")]
    pub data: Vec<u8>,
}

impl BinaryPayload {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

impl std::fmt::Debug for BinaryPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryPayload")
            .field("filename", &self.filename)
            .field("data", &format_args!("[{} bytes]", self.data.len()))
            .finish()
    }
}

/// Decrypted binary record.
#[derive(Clone, Serialize)]
pub struct BinaryView {
    pub id: Uuid,
    pub filename: String,
    #[serde(with = "base64_data")]
    pub data: Vec<u8>,
}

impl std::fmt::Debug for BinaryView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryView")
            .field("id", &self.id)
            .field("filename", &self.filename)
            .field("data", &format_args!("[{} bytes]", self.data.len()))
            .finish()
    }
}

/// Result of creating a binary record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinaryReceipt {
    pub id: Uuid,
    pub filename: String,
}

mod base64_data {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| de::Error::custom(format!("data is not base64: {}", e)))
    }
}

impl RecordKind for Binary {
    const NAME: &'static str = "binary";
    const SENSITIVE_FIELDS: &'static [&'static str] = &["data"];

    type Payload = BinaryPayload;
    type Sealed = NewBinaryRecord;
    type Stored = BinaryRecord;
    type View = BinaryView;
    type Receipt = BinaryReceipt;

    fn seal(payload: BinaryPayload, owner_id: Uuid, key: &EncryptionKey) -> Result<NewBinaryRecord> {
        validate_filename(&payload.filename)?;
        validate_binary_size(payload.data.len())?;

        let encoded = Zeroizing::new(STANDARD.encode(&payload.data));
        Ok(NewBinaryRecord {
            owner_id,
            filename: payload.filename,
            cipher_blob: encrypt(encoded.as_bytes(), key.as_bytes())?,
        })
    }

    fn receipt(id: Uuid, sealed: &NewBinaryRecord) -> BinaryReceipt {
        BinaryReceipt {
            id,
            filename: sealed.filename.clone(),
        }
    }

    fn open(stored: BinaryRecord, key: &EncryptionKey) -> Result<BinaryView> {
        let encoded = Zeroizing::new(decrypt_string(&stored.cipher_blob, key.as_bytes())?);
        let data = STANDARD.decode(encoded.as_bytes()).map_err(|e| {
            VaultError::MalformedCiphertext(format!("Decrypted blob is not base64: {}", e))
        })?;
        Ok(BinaryView {
            id: stored.id,
            filename: stored.filename,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_from(sealed: NewBinaryRecord) -> BinaryRecord {
        BinaryRecord {
            id: Uuid::new_v4(),
            owner_id: sealed.owner_id,
            filename: sealed.filename,
            cipher_blob: sealed.cipher_blob,
        }
    }

    #[test]
    fn test_seal_open_bytes() {
        let key = EncryptionKey::generate().unwrap();
        let sealed =
            Binary::seal(BinaryPayload::new("a.txt", vec![0x41, 0x42]), Uuid::new_v4(), &key)
                .unwrap();
        assert_eq!(sealed.filename, "a.txt");

        let view = Binary::open(stored_from(sealed), &key).unwrap();
        assert_eq!(view.filename, "a.txt");
        assert_eq!(view.data, vec![0x41, 0x42]);
    }

    #[test]
    fn test_blob_is_encrypted_base64_text() {
        let key = EncryptionKey::generate().unwrap();
        let sealed =
            Binary::seal(BinaryPayload::new("a.bin", vec![0u8, 1, 2, 255]), Uuid::new_v4(), &key)
                .unwrap();
        let inner = crate::crypto::decrypt_string(&sealed.cipher_blob, key.as_bytes()).unwrap();
        assert_eq!(inner, STANDARD.encode([0u8, 1, 2, 255]));
    }

    #[test]
    fn test_empty_data_allowed() {
        let key = EncryptionKey::generate().unwrap();
        let sealed =
            Binary::seal(BinaryPayload::new("empty", Vec::new()), Uuid::new_v4(), &key).unwrap();
        assert!(Binary::open(stored_from(sealed), &key).unwrap().data.is_empty());
    }

    #[test]
    fn test_payload_json_uses_base64() {
        let payload: BinaryPayload =
            serde_json::from_str(r#"{"file_name":"a.txt","data":"QUI="}"#).unwrap();
        assert_eq!(payload.filename, "a.txt");
        assert_eq!(payload.data, b"AB");

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["data"], "QUI=");

        assert!(serde_json::from_str::<BinaryPayload>(r#"{"filename":"a","data":[65,66]}"#).is_err());
    }

    #[test]
    fn test_path_in_filename_rejected() {
        let key = EncryptionKey::generate().unwrap();
        let err = Binary::seal(
            BinaryPayload::new("../escape", vec![1]),
            Uuid::new_v4(),
            &key,
        )
        .unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
    }

    #[test]
    fn test_wrong_key_fails_cleanly() {
        let key = EncryptionKey::generate().unwrap();
        let other = EncryptionKey::generate().unwrap();
        let sealed = Binary::seal(
            BinaryPayload::new("a.txt", b"some longer content to decode".to_vec()),
            Uuid::new_v4(),
            &key,
        )
        .unwrap();
        let err = Binary::open(stored_from(sealed), &other).unwrap_err();
        assert!(matches!(err, VaultError::MalformedCiphertext(_)));
    }
}
