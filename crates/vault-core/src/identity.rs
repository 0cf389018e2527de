//! User registration and authentication.
//!
//! Each user gets one encryption key at registration. Authentication hands
//! back that same key, so every session a user opens decrypts the same
//! records.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use secrecy::SecretString;
use tracing::{info, warn};
use uuid::Uuid;

use crate::crypto::{validate_login, validate_password, CredentialHasher, EncryptionKey};
use crate::error::{Result, VaultError};
use crate::storage::{NewUser, UserStore};

/// Identity and key of a registered or authenticated user.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user_id: Uuid,
    pub encryption_key: EncryptionKey,
}

/// Registry counters. Observability only; never consulted for decisions.
#[derive(Debug, Default)]
pub struct RegistryMetrics {
    registrations: AtomicU64,
    authentications: AtomicU64,
    failed_authentications: AtomicU64,
    password_checks: AtomicU64,
}

/// Point-in-time copy of [`RegistryMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub registrations: u64,
    pub authentications: u64,
    pub failed_authentications: u64,
    pub password_checks: u64,
}

impl RegistryMetrics {
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            registrations: self.registrations.load(Ordering::Relaxed),
            authentications: self.authentications.load(Ordering::Relaxed),
            failed_authentications: self.failed_authentications.load(Ordering::Relaxed),
            password_checks: self.password_checks.load(Ordering::Relaxed),
        }
    }
}

/// Registers and authenticates users against a [`UserStore`].
///
/// The store is the only source of truth; the registry keeps no user cache.
pub struct IdentityRegistry<S> {
    store: Arc<S>,
    hasher: CredentialHasher,
    metrics: RegistryMetrics,
}

impl<S: UserStore> IdentityRegistry<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_hasher(store, CredentialHasher::default())
    }

    pub fn with_hasher(store: Arc<S>, hasher: CredentialHasher) -> Self {
        Self {
            store,
            hasher,
            metrics: RegistryMetrics::default(),
        }
    }

    pub fn metrics(&self) -> &RegistryMetrics {
        &self.metrics
    }

    /// Register a new user and generate their encryption key.
    ///
    /// Performs exactly one storage write.
    ///
    /// # Errors
    ///
    /// - `VaultError::Validation` for a bad login or empty password
    /// - `VaultError::DuplicateLogin` if the login is taken
    pub fn register(&self, login: &str, password: &SecretString) -> Result<Registration> {
        validate_login(login)?;
        validate_password(password)?;

        let encryption_key = EncryptionKey::generate()?;
        let password_hash = self.hasher.hash(password)?;

        let user_id = self.store.insert_user(&NewUser {
            login: login.to_string(),
            password_hash,
            encryption_key: encryption_key.clone(),
        })?;

        self.metrics.registrations.fetch_add(1, Ordering::Relaxed);
        info!(user_id = %user_id, "User registered");

        Ok(Registration {
            user_id,
            encryption_key,
        })
    }

    /// Check a login and password and return the stored id and key.
    ///
    /// Performs exactly one storage read. The key is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidCredentials` for an unknown login and for
    /// a wrong password alike. Both paths pay one full Argon2 verification.
    pub fn authenticate(&self, login: &str, password: &SecretString) -> Result<Registration> {
        let user = self.store.select_user(login)?;
        self.metrics.password_checks.fetch_add(1, Ordering::Relaxed);
        let verified = match &user {
            Some(user) => self.hasher.verify(password, &user.password_hash)?,
            None => self.hasher.verify_missing(password)?,
        };

        let user = match user {
            Some(user) if verified => user,
            _ => {
                self.metrics
                    .failed_authentications
                    .fetch_add(1, Ordering::Relaxed);
                warn!("Authentication failed");
                return Err(VaultError::InvalidCredentials);
            }
        };

        self.metrics.authentications.fetch_add(1, Ordering::Relaxed);
        Ok(Registration {
            user_id: user.id,
            encryption_key: user.encryption_key.clone(),
        })
    }
}
