//! Per-user encryption keys.
//!
//! Every user owns exactly one 256-bit key, generated at registration and
//! never regenerated on login. The key is persisted in the user row and
//! carried inside session tokens; it never appears in record rows.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::ZeroizeOnDrop;

use crate::error::{Result, VaultError};

/// Length of an encryption key in bytes (32 bytes = 256 bits for AES-256).
pub const KEY_LENGTH: usize = 32;

/// A user's record encryption key.
///
/// Key material is zeroized from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct EncryptionKey {
    /// The raw key bytes (zeroized on drop)
    key: [u8; KEY_LENGTH],
}

impl EncryptionKey {
    /// Generate a fresh key from the operating system's CSPRNG.
    pub fn generate() -> Result<Self> {
        let mut key = [0u8; KEY_LENGTH];
        OsRng
            .try_fill_bytes(&mut key)
            .map_err(|e| VaultError::Crypto(format!("Failed to generate key: {}", e)))?;
        Ok(Self { key })
    }

    /// Build a key from raw bytes, rejecting any length other than 32.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let key: [u8; KEY_LENGTH] = bytes.try_into().map_err(|_| VaultError::InvalidKey {
            expected: KEY_LENGTH,
            actual: bytes.len(),
        })?;
        Ok(Self { key })
    }

    /// Decode a key from standard base64, the form used in user rows and tokens.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = zeroize::Zeroizing::new(
            STANDARD
                .decode(encoded)
                .map_err(|e| VaultError::Validation(format!("Invalid key encoding: {}", e)))?,
        );
        Self::from_slice(&bytes)
    }

    /// Encode the key as standard base64.
    ///
    /// Avoid logging the result.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.key)
    }

    /// Get a reference to the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_differ() {
        let a = EncryptionKey::generate().unwrap();
        let b = EncryptionKey::generate().unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_base64_round_trip() {
        let key = EncryptionKey::generate().unwrap();
        let decoded = EncryptionKey::from_base64(&key.to_base64()).unwrap();
        assert_eq!(key.as_bytes(), decoded.as_bytes());
    }

    #[test]
    fn test_wrong_length_rejected() {
        let err = EncryptionKey::from_slice(&[0u8; 16]).unwrap_err();
        assert!(matches!(
            err,
            VaultError::InvalidKey {
                expected: 32,
                actual: 16
            }
        ));
    }

    #[test]
    fn test_debug_redacts() {
        let key = EncryptionKey::generate().unwrap();
        let debug_output = format!("{:?}", key);
        assert!(debug_output.contains("REDACTED"));

        let key_hex = hex::encode(&key.as_bytes()[..4]);
        assert!(!debug_output.contains(&key_hex));
    }
}
