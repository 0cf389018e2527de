//! The vault facade: identity, sessions and records over one store.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use secrecy::SecretString;
use serde::Serialize;
use uuid::Uuid;

use crate::crypto::CredentialHasher;
use crate::error::Result;
use crate::identity::{IdentityRegistry, Registration};
use crate::records::{Binary, Card, RecordService, Text};
use crate::session::{SessionClaims, SessionTokenCodec};
use crate::storage::StorageEngine;

/// An issued session.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Entry point for embedding the vault.
///
/// `Vault` is `Sync` when its store is, so one instance can serve
/// concurrent callers; nothing in it is tied to a particular session.
pub struct Vault<S> {
    registry: IdentityRegistry<S>,
    codec: SessionTokenCodec,
    texts: RecordService<Text, S>,
    binaries: RecordService<Binary, S>,
    cards: RecordService<Card, S>,
}

impl<S: StorageEngine> Vault<S> {
    pub fn new(store: Arc<S>, codec: SessionTokenCodec) -> Self {
        Self::with_hasher(store, codec, CredentialHasher::default())
    }

    pub fn with_hasher(store: Arc<S>, codec: SessionTokenCodec, hasher: CredentialHasher) -> Self {
        Self {
            registry: IdentityRegistry::with_hasher(Arc::clone(&store), hasher),
            codec,
            texts: RecordService::new(Arc::clone(&store)),
            binaries: RecordService::new(Arc::clone(&store)),
            cards: RecordService::new(store),
        }
    }

    /// Register a user and open their first session.
    pub fn register(&self, login: &str, password: &SecretString) -> Result<Session> {
        let registration = self.registry.register(login, password)?;
        self.open_session(&registration)
    }

    /// Authenticate a user and open a session.
    pub fn login(&self, login: &str, password: &SecretString) -> Result<Session> {
        let registration = self.registry.authenticate(login, password)?;
        self.open_session(&registration)
    }

    /// Verify a bearer token and return its claims.
    pub fn authorize(&self, token: &str) -> Result<SessionClaims> {
        self.codec.verify(token)
    }

    fn open_session(&self, registration: &Registration) -> Result<Session> {
        // The token carries whole seconds only.
        let expires_at = (Utc::now() + self.codec.ttl()).trunc_subsecs(0);
        let token = self.codec.issue_expiring_at(
            registration.user_id,
            &registration.encryption_key,
            expires_at,
        )?;
        Ok(Session {
            user_id: registration.user_id,
            token,
            expires_at,
        })
    }

    pub fn registry(&self) -> &IdentityRegistry<S> {
        &self.registry
    }

    pub fn texts(&self) -> &RecordService<Text, S> {
        &self.texts
    }

    pub fn binaries(&self) -> &RecordService<Binary, S> {
        &self.binaries
    }

    pub fn cards(&self) -> &RecordService<Card, S> {
        &self.cards
    }
}
