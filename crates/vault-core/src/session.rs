//! Stateless signed session tokens.
//!
//! A token is a compact HS256 JWT (`header.payload.signature`) whose payload
//! is `{user_key, encryption_key, exp}`. There is no server-side session
//! table: a token stays valid until `exp`, and possession of a valid token
//! is the whole of authentication.
//!
//! # Security
//!
//! The payload is signed, not encrypted. Anyone who can read a token can
//! base64-decode it and recover the user's encryption key.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::crypto::EncryptionKey;
use crate::error::{Result, VaultError};

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Minimum signing secret length in bytes.
pub const MIN_SECRET_BYTES: usize = 16;

/// Verified contents of a session token.
#[derive(Debug, Clone)]
pub struct SessionClaims {
    /// Authenticated user
    pub user_id: Uuid,

    /// The user's record encryption key
    pub encryption_key: EncryptionKey,

    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Wire form of the token payload.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    user_key: String,
    encryption_key: String,
    exp: i64,
}

/// Issues and verifies session tokens with a server-held secret.
#[derive(Clone)]
pub struct SessionTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionTokenCodec {
    /// Create a codec signing with `secret` and the default 24 hour lifetime.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Validation` if the secret is shorter than 16 bytes.
    pub fn new(secret: &[u8]) -> Result<Self> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(VaultError::Validation(format!(
                "Signing secret must be at least {} bytes (got {})",
                MIN_SECRET_BYTES,
                secret.len()
            )));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        })
    }

    /// Override the token lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Token lifetime applied by [`issue`](Self::issue).
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id` carrying `encryption_key`, expiring one
    /// TTL from now.
    pub fn issue(&self, user_id: Uuid, encryption_key: &EncryptionKey) -> Result<String> {
        self.issue_expiring_at(user_id, encryption_key, Utc::now() + self.ttl)
    }

    /// Issue a token with an explicit expiry.
    pub fn issue_expiring_at(
        &self,
        user_id: Uuid,
        encryption_key: &EncryptionKey,
        expires_at: DateTime<Utc>,
    ) -> Result<String> {
        let claims = TokenClaims {
            user_key: user_id.to_string(),
            encryption_key: encryption_key.to_base64(),
            exp: expires_at.timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| VaultError::Crypto(format!("Failed to sign session token: {}", e)))
    }

    /// Verify a token's structure, signature and expiry.
    ///
    /// # Errors
    ///
    /// - `VaultError::MalformedToken` if the token cannot be parsed
    /// - `VaultError::InvalidSignature` on any tampering
    /// - `VaultError::TokenExpired` once `exp` has passed
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
            return Err(VaultError::MalformedToken(
                "Expected header.payload.signature".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &validation)
            .map_err(|e| {
                let err = match e.kind() {
                    JwtErrorKind::InvalidSignature => VaultError::InvalidSignature,
                    JwtErrorKind::ExpiredSignature => VaultError::TokenExpired,
                    _ => VaultError::MalformedToken(e.to_string()),
                };
                warn!(error = %err, "Rejected session token");
                err
            })?;
        let claims = data.claims;

        let user_id = Uuid::parse_str(&claims.user_key)
            .map_err(|e| VaultError::MalformedToken(format!("Invalid user_key: {}", e)))?;
        let encryption_key = EncryptionKey::from_base64(&claims.encryption_key)
            .map_err(|e| VaultError::MalformedToken(format!("Invalid encryption_key: {}", e)))?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| VaultError::MalformedToken("Invalid exp".to_string()))?;

        Ok(SessionClaims {
            user_id,
            encryption_key,
            expires_at,
        })
    }
}

impl std::fmt::Debug for SessionTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenCodec")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}
