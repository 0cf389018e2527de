//! Payload validation for record kinds.
//!
//! Runs before anything is encrypted, so a rejected payload never reaches
//! storage.

use crate::error::{Result, VaultError};

/// Maximum bytes for a text record body.
pub const MAX_TEXT_BYTES: usize = 1024 * 1024;

/// Maximum raw bytes for a binary record.
pub const MAX_BINARY_BYTES: usize = 16 * 1024 * 1024;

/// Maximum bytes for a binary record filename.
pub const MAX_FILENAME_BYTES: usize = 255;

/// Maximum bytes for a cardholder name.
pub const MAX_CARDHOLDER_BYTES: usize = 128;

/// Validate a text record body.
pub fn validate_text(text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(VaultError::Validation("Text cannot be empty".to_string()));
    }
    if text.len() > MAX_TEXT_BYTES {
        return Err(VaultError::Validation(format!(
            "Text too large (max {} bytes)",
            MAX_TEXT_BYTES
        )));
    }
    Ok(())
}

/// Validate a binary record filename.
///
/// Filenames are written back to disk by clients, so anything that could
/// escape the target directory is rejected.
pub fn validate_filename(filename: &str) -> Result<()> {
    if filename.trim().is_empty() {
        return Err(VaultError::Validation(
            "Filename cannot be empty".to_string(),
        ));
    }
    if filename.len() > MAX_FILENAME_BYTES {
        return Err(VaultError::Validation(format!(
            "Filename too long (max {} bytes)",
            MAX_FILENAME_BYTES
        )));
    }
    if filename == "." || filename == ".." {
        return Err(VaultError::Validation(format!(
            "Invalid filename: {}",
            filename
        )));
    }
    if filename
        .chars()
        .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control())
    {
        return Err(VaultError::Validation(
            "Filename contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Validate binary payload size.
pub fn validate_binary_size(len: usize) -> Result<()> {
    if len > MAX_BINARY_BYTES {
        return Err(VaultError::Validation(format!(
            "Binary data too large (max {} bytes)",
            MAX_BINARY_BYTES
        )));
    }
    Ok(())
}

/// Strip spaces and dashes from a card number and check it is 12-19 digits.
pub fn normalize_card_number(number: &str) -> Result<String> {
    let digits: String = number.chars().filter(|c| *c != ' ' && *c != '-').collect();
    if digits.len() < 12 || digits.len() > 19 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(VaultError::Validation(
            "Card number must be 12-19 digits".to_string(),
        ));
    }
    Ok(digits)
}

/// Validate a cardholder name.
pub fn validate_cardholder_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(VaultError::Validation(
            "Cardholder name cannot be empty".to_string(),
        ));
    }
    if name.len() > MAX_CARDHOLDER_BYTES {
        return Err(VaultError::Validation(format!(
            "Cardholder name too long (max {} bytes)",
            MAX_CARDHOLDER_BYTES
        )));
    }
    Ok(())
}

/// Validate an `MM/YY` expiration date.
pub fn validate_expiration_date(value: &str) -> Result<()> {
    let invalid = || VaultError::Validation("Expiration date must be MM/YY".to_string());

    let (month, year) = value.split_once('/').ok_or_else(invalid)?;
    if month.len() != 2 || year.len() != 2 {
        return Err(invalid());
    }
    if !month.chars().chain(year.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let month: u8 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(VaultError::Validation(format!(
            "Expiration month out of range: {:02}",
            month
        )));
    }
    Ok(())
}

/// Validate a card verification code (3 or 4 digits).
pub fn validate_cvv(cvv: &str) -> Result<()> {
    if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
        return Err(VaultError::Validation("CVV must be 3 or 4 digits".to_string()));
    }
    Ok(())
}

/// Mask all but the last four digits of a card number.
pub fn mask_card_number(number: &str) -> String {
    let tail: String = number
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("**** {}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_limits() {
        assert!(validate_text("hello world").is_ok());
        assert!(validate_text("").is_err());
        assert!(validate_text(&"x".repeat(MAX_TEXT_BYTES + 1)).is_err());
    }

    #[test]
    fn test_filename_rules() {
        assert!(validate_filename("a.txt").is_ok());
        assert!(validate_filename("report 2024.pdf").is_ok());
        for bad in ["", "  ", ".", "..", "../etc/passwd", "dir/file", "c:\\x", "a\0b"] {
            assert!(validate_filename(bad).is_err(), "{:?}", bad);
        }
        assert!(validate_filename(&"f".repeat(MAX_FILENAME_BYTES + 1)).is_err());
    }

    #[test]
    fn test_card_number_normalized() {
        assert_eq!(
            normalize_card_number("4111 1111-1111 1111").unwrap(),
            "4111111111111111"
        );
        assert!(normalize_card_number("1234").is_err());
        assert!(normalize_card_number("4111x11111111111").is_err());
        assert!(normalize_card_number(&"1".repeat(20)).is_err());
    }

    #[test]
    fn test_expiration_date() {
        assert!(validate_expiration_date("01/30").is_ok());
        assert!(validate_expiration_date("12/99").is_ok());
        for bad in ["13/30", "00/30", "1/30", "01-30", "ab/cd", "01/2030", ""] {
            assert!(validate_expiration_date(bad).is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn test_cvv() {
        assert!(validate_cvv("123").is_ok());
        assert!(validate_cvv("1234").is_ok());
        assert!(validate_cvv("12").is_err());
        assert!(validate_cvv("12a").is_err());
    }

    #[test]
    fn test_mask_card_number() {
        assert_eq!(mask_card_number("4111111111111234"), "**** 1234");
    }
}
