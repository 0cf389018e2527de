//! Password credential hashing and login/password validation.
//!
//! Stored credentials are Argon2id PHC strings with a per-user random salt.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use once_cell::sync::OnceCell;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{Result, VaultError};

/// Default Argon2id memory cost: 19 MiB.
pub const DEFAULT_MEMORY_KIB: u32 = 19 * 1024;
/// Default Argon2id iteration count.
pub const DEFAULT_ITERATIONS: u32 = 2;
/// Default Argon2id parallelism.
pub const DEFAULT_PARALLELISM: u32 = 1;

/// Maximum login length in bytes.
pub const MAX_LOGIN_BYTES: usize = 64;

const PLACEHOLDER_PASSWORD: &str = "vault-placeholder-credential";

/// Hashes and verifies password credentials.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
    // Hash checked when a login has no stored credential.
    placeholder: OnceCell<String>,
}

impl CredentialHasher {
    /// Hasher with explicit Argon2id costs.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Validation` if the parameters are outside
    /// Argon2's accepted ranges.
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| VaultError::Validation(format!("Invalid Argon2 parameters: {}", e)))?;
        Ok(Self::from_params(params))
    }

    fn from_params(params: Params) -> Self {
        Self {
            params,
            placeholder: OnceCell::new(),
        }
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password into a PHC string.
    pub fn hash(&self, password: &SecretString) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.expose_secret().as_bytes(), &salt)
            .map_err(|e| VaultError::Crypto(format!("Password hashing failed: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Check a password against a stored PHC string.
    ///
    /// The parameters embedded in the PHC string win over this hasher's
    /// own, so hashes made under older settings keep verifying.
    pub fn verify(&self, password: &SecretString, stored: &str) -> Result<bool> {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| VaultError::Storage(format!("Invalid stored credential: {}", e)))?;
        match self
            .argon2()
            .verify_password(password.expose_secret().as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(VaultError::Crypto(format!(
                "Password verification failed: {}",
                e
            ))),
        }
    }

    /// Run a full verification for a login that has no stored credential.
    ///
    /// Costs the same as [`verify`](Self::verify) under this hasher's
    /// parameters and always reports a mismatch.
    pub fn verify_missing(&self, password: &SecretString) -> Result<bool> {
        let stored = self.placeholder_hash()?;
        self.verify(password, stored)?;
        Ok(false)
    }

    fn placeholder_hash(&self) -> Result<&str> {
        self.placeholder
            .get_or_try_init(|| self.hash(&SecretString::from(PLACEHOLDER_PASSWORD)))
            .map(String::as_str)
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::from_params(
            Params::new(
                DEFAULT_MEMORY_KIB,
                DEFAULT_ITERATIONS,
                DEFAULT_PARALLELISM,
                None,
            )
            .unwrap_or_default(),
        )
    }
}

/// Validate a login name.
///
/// # Requirements
///
/// - Not empty, at most 64 bytes
/// - No leading or trailing whitespace
/// - No control characters
pub fn validate_login(login: &str) -> Result<()> {
    if login.is_empty() {
        return Err(VaultError::Validation("Login cannot be empty".to_string()));
    }
    if login.len() > MAX_LOGIN_BYTES {
        return Err(VaultError::Validation(format!(
            "Login must be at most {} bytes (got {})",
            MAX_LOGIN_BYTES,
            login.len()
        )));
    }
    if login.trim() != login {
        return Err(VaultError::Validation(
            "Login cannot start or end with whitespace".to_string(),
        ));
    }
    if login.chars().any(char::is_control) {
        return Err(VaultError::Validation(
            "Login contains control characters".to_string(),
        ));
    }
    Ok(())
}

/// Validate a password: it may be short, but never empty or whitespace-only.
pub fn validate_password(password: &SecretString) -> Result<()> {
    if password.expose_secret().trim().is_empty() {
        return Err(VaultError::Validation(
            "Password cannot be empty".to_string(),
        ));
    }
    Ok(())
}
