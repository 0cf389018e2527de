//! Field-level AES-256-CFB encryption.
//!
//! Each sensitive record field is encrypted on its own under the owner's
//! key. The stored form is `base64url(IV || ciphertext)` with a fresh random
//! IV per call, so equal plaintexts never produce equal ciphertexts.
//!
//! CFB carries no authentication tag. A corrupted or foreign ciphertext of
//! valid length decrypts to garbage instead of failing; callers that need
//! text must validate what comes out (see [`decrypt_string`]).

use aes::Aes256;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::crypto::key::KEY_LENGTH;
use crate::error::{Result, VaultError};

type Aes256CfbEnc = cfb_mode::Encryptor<Aes256>;
type Aes256CfbDec = cfb_mode::Decryptor<Aes256>;

/// IV length in bytes (one AES block).
pub const IV_LENGTH: usize = 16;

fn check_key(key: &[u8]) -> Result<()> {
    if key.len() != KEY_LENGTH {
        return Err(VaultError::InvalidKey {
            expected: KEY_LENGTH,
            actual: key.len(),
        });
    }
    Ok(())
}

/// Encrypt `plaintext` under `key`.
///
/// # Errors
///
/// Returns `VaultError::InvalidKey` if `key` is not 32 bytes long.
///
/// # Examples
///
/// ```
/// use vault_core::crypto::{decrypt, encrypt};
///
/// let key = [7u8; 32];
/// let sealed = encrypt(b"secret data", &key).unwrap();
/// assert_eq!(decrypt(&sealed, &key).unwrap(), b"secret data");
/// ```
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<String> {
    check_key(key)?;

    let mut sealed = vec![0u8; IV_LENGTH + plaintext.len()];
    let (iv, body) = sealed.split_at_mut(IV_LENGTH);
    OsRng
        .try_fill_bytes(iv)
        .map_err(|e| VaultError::Crypto(format!("Failed to generate IV: {}", e)))?;
    body.copy_from_slice(plaintext);

    Aes256CfbEnc::new_from_slices(key, iv)
        .map_err(|e| VaultError::Crypto(format!("Failed to create cipher: {}", e)))?
        .encrypt(body);

    Ok(URL_SAFE.encode(&sealed))
}

/// Decrypt a value produced by [`encrypt`].
///
/// # Errors
///
/// Returns `VaultError::InvalidKey` if `key` is not 32 bytes long, and
/// `VaultError::MalformedCiphertext` if the text is not base64url or is
/// shorter than one IV.
pub fn decrypt(ciphertext: &str, key: &[u8]) -> Result<Vec<u8>> {
    check_key(key)?;

    let mut sealed = URL_SAFE
        .decode(ciphertext)
        .map_err(|e| VaultError::MalformedCiphertext(format!("Invalid encoding: {}", e)))?;
    if sealed.len() < IV_LENGTH {
        return Err(VaultError::MalformedCiphertext(format!(
            "Ciphertext too short ({} bytes, need at least {})",
            sealed.len(),
            IV_LENGTH
        )));
    }

    let (iv, body) = sealed.split_at_mut(IV_LENGTH);
    Aes256CfbDec::new_from_slices(key, iv)
        .map_err(|e| VaultError::Crypto(format!("Failed to create cipher: {}", e)))?
        .decrypt(body);

    Ok(body.to_vec())
}

/// Decrypt a value that must hold UTF-8 text.
///
/// A wrong key usually yields invalid UTF-8, which is reported as
/// `VaultError::MalformedCiphertext`.
pub fn decrypt_string(ciphertext: &str, key: &[u8]) -> Result<String> {
    let bytes = decrypt(ciphertext, key)?;
    String::from_utf8(bytes).map_err(|_| {
        VaultError::MalformedCiphertext("Decrypted value is not valid UTF-8".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [0x42; 32];

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let plaintext = b"Hello, World! This is secret data.";
        let sealed = encrypt(plaintext, &KEY).unwrap();
        assert_eq!(decrypt(&sealed, &KEY).unwrap(), plaintext);
    }

    #[test]
    fn test_round_trip_various_lengths() {
        // Lengths around the block size exercise partial final blocks.
        for len in [0usize, 1, 15, 16, 17, 31, 32, 33, 1000] {
            let plaintext: Vec<u8> = (0..len).map(|i| (i * 7 % 251) as u8).collect();
            let sealed = encrypt(&plaintext, &KEY).unwrap();
            assert_eq!(decrypt(&sealed, &KEY).unwrap(), plaintext, "len {}", len);
        }
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let first = encrypt(b"same plaintext", &KEY).unwrap();
        let second = encrypt(b"same plaintext", &KEY).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_layout_is_iv_then_body() {
        let plaintext = b"twelve bytes";
        let sealed = encrypt(plaintext, &KEY).unwrap();
        let raw = URL_SAFE.decode(&sealed).unwrap();
        assert_eq!(raw.len(), IV_LENGTH + plaintext.len());
        assert_ne!(&raw[IV_LENGTH..], plaintext);
    }

    #[test]
    fn test_output_is_url_safe() {
        for _ in 0..32 {
            let sealed = encrypt(&[0xFF; 48], &KEY).unwrap();
            assert!(!sealed.contains('+'));
            assert!(!sealed.contains('/'));
        }
    }

    #[test]
    fn test_short_key_rejected() {
        let err = encrypt(b"data", &[1u8; 16]).unwrap_err();
        assert!(matches!(err, VaultError::InvalidKey { actual: 16, .. }));

        let sealed = encrypt(b"data", &KEY).unwrap();
        let err = decrypt(&sealed, &[1u8; 33]).unwrap_err();
        assert!(matches!(err, VaultError::InvalidKey { actual: 33, .. }));
    }

    #[test]
    fn test_truncated_ciphertext_rejected() {
        let short = URL_SAFE.encode([0u8; IV_LENGTH - 1]);
        let err = decrypt(&short, &KEY).unwrap_err();
        assert!(matches!(err, VaultError::MalformedCiphertext(_)));
    }

    #[test]
    fn test_invalid_encoding_rejected() {
        let err = decrypt("not base64 at all!", &KEY).unwrap_err();
        assert!(matches!(err, VaultError::MalformedCiphertext(_)));
    }

    #[test]
    fn test_corruption_is_not_detected() {
        let plaintext = b"unauthenticated stream cipher";
        let sealed = encrypt(plaintext, &KEY).unwrap();
        let mut raw = URL_SAFE.decode(&sealed).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;

        let tampered = decrypt(&URL_SAFE.encode(&raw), &KEY).unwrap();
        assert_eq!(tampered.len(), plaintext.len());
        assert_ne!(tampered, plaintext);
    }

    #[test]
    fn test_wrong_key_yields_different_bytes() {
        let sealed = encrypt(b"secret data", &KEY).unwrap();
        let other = decrypt(&sealed, &[0x24; 32]).unwrap();
        assert_ne!(other, b"secret data");
    }
}
