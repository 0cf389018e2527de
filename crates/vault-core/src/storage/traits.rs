//! Storage collaborator interfaces.
//!
//! The core never talks to a database directly. Backends implement
//! `UserStore` plus one `RecordStore<K>` per record kind; anything that
//! implements all of them is a `StorageEngine`.
//!
//! All implementations must ensure:
//! - Inserts generate the record id atomically (UUID v4, globally unique)
//! - Record inserts fail when `owner_id` names no existing user
//! - Select and delete are scoped to `(id, owner_id)` in a single step, so a
//!   row owned by someone else is indistinguishable from a missing one
//! - Errors are returned unchanged; no retries

use uuid::Uuid;

use super::types::{NewUser, User};
use crate::error::Result;
use crate::records::{Binary, Card, RecordKind, Text};

/// User persistence.
pub trait UserStore: Send + Sync {
    /// Insert a user and return its generated id.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::DuplicateLogin` if the login is taken.
    fn insert_user(&self, user: &NewUser) -> Result<Uuid>;

    /// Look up a user by login.
    ///
    /// Returns `Ok(None)` if no such login exists.
    fn select_user(&self, login: &str) -> Result<Option<User>>;
}

/// Persistence for one record kind.
pub trait RecordStore<K: RecordKind>: Send + Sync {
    /// Insert a sealed record and return its generated id.
    ///
    /// # Errors
    ///
    /// Fails with a storage error if the owner has no user row.
    fn insert(&self, record: &K::Sealed) -> Result<Uuid>;

    /// Fetch a record only if it is owned by `owner_id`.
    fn select_by_id_and_owner(&self, id: &Uuid, owner_id: &Uuid) -> Result<Option<K::Stored>>;

    /// Delete a record only if it is owned by `owner_id`.
    ///
    /// Returns `Ok(false)` when no row matched.
    fn delete_by_id_and_owner(&self, id: &Uuid, owner_id: &Uuid) -> Result<bool>;
}

/// A complete storage backend.
pub trait StorageEngine:
    UserStore + RecordStore<Text> + RecordStore<Binary> + RecordStore<Card>
{
}

impl<T> StorageEngine for T where
    T: UserStore + RecordStore<Text> + RecordStore<Binary> + RecordStore<Card>
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_definition_compiles() {
        fn _accepts_storage_engine<T: StorageEngine>(_engine: T) {}
        fn _accepts_text_store<T: RecordStore<Text>>(_store: &T) {}
    }
}
