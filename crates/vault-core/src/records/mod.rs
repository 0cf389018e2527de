//! Encrypted records and the service that owns their lifecycle.
//!
//! One generic [`RecordService`] handles every record kind. A kind
//! ([`Text`], [`Binary`], [`Card`]) says which of its fields are sensitive
//! and how to seal them under the caller's key; the service supplies the
//! shared flow:
//!
//! - `create`: validate, encrypt sensitive fields, set the owner, insert
//! - `read`: select scoped to `(id, owner)`, decrypt
//! - `delete`: delete scoped to `(id, owner)`
//!
//! A record owned by another user is reported exactly like a missing one.

mod binary;
mod card;
mod text;
pub mod validation;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::crypto::EncryptionKey;
use crate::error::{Result, VaultError};
use crate::session::SessionClaims;
use crate::storage::RecordStore;

pub use binary::{Binary, BinaryPayload, BinaryReceipt, BinaryView};
pub use card::{Card, CardPayload, CardReceipt, CardView};
pub use text::{Text, TextPayload, TextReceipt, TextView};

/// A kind of vault record.
///
/// Implementors are uninhabited marker types; all the behavior is in the
/// associated functions.
pub trait RecordKind: 'static {
    /// Name used in logs and messages.
    const NAME: &'static str;

    /// Payload fields that are stored encrypted.
    const SENSITIVE_FIELDS: &'static [&'static str];

    /// Plaintext input to `create`.
    type Payload: DeserializeOwned;

    /// Encrypted row ready for insert.
    type Sealed: Send + Sync;

    /// Encrypted row as stored, with id.
    type Stored;

    /// Plaintext result of `read`.
    type View;

    /// Non-sensitive echo returned by `create`.
    type Receipt;

    /// Validate `payload` and encrypt its sensitive fields under `key`.
    fn seal(payload: Self::Payload, owner_id: Uuid, key: &EncryptionKey) -> Result<Self::Sealed>;

    /// Build the create response from the assigned id.
    fn receipt(id: Uuid, sealed: &Self::Sealed) -> Self::Receipt;

    /// Decrypt a stored row.
    fn open(stored: Self::Stored, key: &EncryptionKey) -> Result<Self::View>;
}

/// Parse a record identifier supplied as text.
pub fn parse_record_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|e| VaultError::Validation(format!("Invalid record ID: {}", e)))
}

/// Create/read/delete for one record kind.
///
/// Holds no per-session state: every call works only from the claims it is
/// given and the shared store, so one instance serves concurrent callers.
pub struct RecordService<K, S> {
    store: Arc<S>,
    kind: PhantomData<fn() -> K>,
}

impl<K, S> Clone for RecordService<K, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            kind: PhantomData,
        }
    }
}

impl<K, S> RecordService<K, S>
where
    K: RecordKind,
    S: RecordStore<K>,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            kind: PhantomData,
        }
    }

    /// Encrypt and store a new record owned by the session's user.
    pub fn create(&self, claims: &SessionClaims, payload: K::Payload) -> Result<K::Receipt> {
        let sealed = K::seal(payload, claims.user_id, &claims.encryption_key)?;
        let id = self.store.insert(&sealed)?;
        debug!(
            kind = K::NAME,
            record_id = %id,
            owner_id = %claims.user_id,
            sealed_fields = ?K::SENSITIVE_FIELDS,
            "Record created"
        );
        Ok(K::receipt(id, &sealed))
    }

    /// Parse a JSON payload and create a record from it.
    ///
    /// # Errors
    ///
    /// Malformed JSON is a `VaultError::Validation`.
    pub fn create_json(&self, claims: &SessionClaims, body: &[u8]) -> Result<K::Receipt> {
        let payload: K::Payload = serde_json::from_slice(body)?;
        self.create(claims, payload)
    }

    /// Read and decrypt a record owned by the session's user.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::RecordNotFound` whether the record is absent or
    /// belongs to someone else.
    pub fn read(&self, claims: &SessionClaims, id: &Uuid) -> Result<K::View> {
        let stored = self
            .store
            .select_by_id_and_owner(id, &claims.user_id)?
            .ok_or(VaultError::RecordNotFound(*id))?;
        debug!(kind = K::NAME, record_id = %id, owner_id = %claims.user_id, "Record read");
        K::open(stored, &claims.encryption_key)
    }

    /// Delete a record owned by the session's user.
    ///
    /// # Errors
    ///
    /// Same not-found rule as [`read`](Self::read).
    pub fn delete(&self, claims: &SessionClaims, id: &Uuid) -> Result<()> {
        if !self.store.delete_by_id_and_owner(id, &claims.user_id)? {
            return Err(VaultError::RecordNotFound(*id));
        }
        debug!(kind = K::NAME, record_id = %id, owner_id = %claims.user_id, "Record deleted");
        Ok(())
    }
}
