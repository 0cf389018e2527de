//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use uuid::Uuid;

use super::traits::{RecordStore, UserStore};
use super::types::{
    BinaryRecord, CardRecord, NewBinaryRecord, NewCardRecord, NewTextRecord, NewUser, TextRecord,
    User,
};
use crate::error::{Result, VaultError};
use crate::records::{Binary, Card, Text};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    texts: HashMap<Uuid, TextRecord>,
    binaries: HashMap<Uuid, BinaryRecord>,
    cards: HashMap<Uuid, CardRecord>,
}

/// Storage held entirely in process memory.
///
/// One `RwLock` guards all tables, so each operation is atomic with respect
/// to every other.
#[derive(Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| VaultError::Storage("Memory storage lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| VaultError::Storage("Memory storage lock poisoned".to_string()))
    }

    /// Total number of records of every kind.
    pub fn record_count(&self) -> usize {
        self.read()
            .map(|t| t.texts.len() + t.binaries.len() + t.cards.len())
            .unwrap_or(0)
    }
}

/// Reject records whose owner has no user row.
fn ensure_owner(tables: &Tables, owner_id: &Uuid) -> Result<()> {
    if tables.users.values().any(|u| u.id == *owner_id) {
        Ok(())
    } else {
        Err(VaultError::Storage(format!(
            "Record owner does not exist: {}",
            owner_id
        )))
    }
}

/// Generate an id not used by any record of any kind.
fn fresh_id(tables: &Tables) -> Uuid {
    loop {
        let id = Uuid::new_v4();
        if !tables.texts.contains_key(&id)
            && !tables.binaries.contains_key(&id)
            && !tables.cards.contains_key(&id)
        {
            return id;
        }
    }
}

impl UserStore for MemoryStorage {
    fn insert_user(&self, user: &NewUser) -> Result<Uuid> {
        let mut tables = self.write()?;
        if tables.users.contains_key(&user.login) {
            return Err(VaultError::DuplicateLogin(user.login.clone()));
        }
        let id = Uuid::new_v4();
        tables.users.insert(
            user.login.clone(),
            User {
                id,
                login: user.login.clone(),
                password_hash: user.password_hash.clone(),
                encryption_key: user.encryption_key.clone(),
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    fn select_user(&self, login: &str) -> Result<Option<User>> {
        Ok(self.read()?.users.get(login).cloned())
    }
}

impl RecordStore<Text> for MemoryStorage {
    fn insert(&self, record: &NewTextRecord) -> Result<Uuid> {
        let mut tables = self.write()?;
        ensure_owner(&tables, &record.owner_id)?;
        let id = fresh_id(&tables);
        tables.texts.insert(
            id,
            TextRecord {
                id,
                owner_id: record.owner_id,
                cipher_text: record.cipher_text.clone(),
            },
        );
        Ok(id)
    }

    fn select_by_id_and_owner(&self, id: &Uuid, owner_id: &Uuid) -> Result<Option<TextRecord>> {
        Ok(self
            .read()?
            .texts
            .get(id)
            .filter(|r| r.owner_id == *owner_id)
            .cloned())
    }

    fn delete_by_id_and_owner(&self, id: &Uuid, owner_id: &Uuid) -> Result<bool> {
        let mut tables = self.write()?;
        let owned = tables
            .texts
            .get(id)
            .is_some_and(|r| r.owner_id == *owner_id);
        if owned {
            tables.texts.remove(id);
        }
        Ok(owned)
    }
}

impl RecordStore<Binary> for MemoryStorage {
    fn insert(&self, record: &NewBinaryRecord) -> Result<Uuid> {
        let mut tables = self.write()?;
        ensure_owner(&tables, &record.owner_id)?;
        let id = fresh_id(&tables);
        tables.binaries.insert(
            id,
            BinaryRecord {
                id,
                owner_id: record.owner_id,
                filename: record.filename.clone(),
                cipher_blob: record.cipher_blob.clone(),
            },
        );
        Ok(id)
    }

    fn select_by_id_and_owner(&self, id: &Uuid, owner_id: &Uuid) -> Result<Option<BinaryRecord>> {
        Ok(self
            .read()?
            .binaries
            .get(id)
            .filter(|r| r.owner_id == *owner_id)
            .cloned())
    }

    fn delete_by_id_and_owner(&self, id: &Uuid, owner_id: &Uuid) -> Result<bool> {
        let mut tables = self.write()?;
        let owned = tables
            .binaries
            .get(id)
            .is_some_and(|r| r.owner_id == *owner_id);
        if owned {
            tables.binaries.remove(id);
        }
        Ok(owned)
    }
}

impl RecordStore<Card> for MemoryStorage {
    fn insert(&self, record: &NewCardRecord) -> Result<Uuid> {
        let mut tables = self.write()?;
        ensure_owner(&tables, &record.owner_id)?;
        let id = fresh_id(&tables);
        tables.cards.insert(
            id,
            CardRecord {
                id,
                owner_id: record.owner_id,
                cipher_card_number: record.cipher_card_number.clone(),
                cardholder_name: record.cardholder_name.clone(),
                expiration_date: record.expiration_date.clone(),
                cipher_cvv: record.cipher_cvv.clone(),
                created_at: record.created_at,
            },
        );
        Ok(id)
    }

    fn select_by_id_and_owner(&self, id: &Uuid, owner_id: &Uuid) -> Result<Option<CardRecord>> {
        Ok(self
            .read()?
            .cards
            .get(id)
            .filter(|r| r.owner_id == *owner_id)
            .cloned())
    }

    fn delete_by_id_and_owner(&self, id: &Uuid, owner_id: &Uuid) -> Result<bool> {
        let mut tables = self.write()?;
        let owned = tables
            .cards
            .get(id)
            .is_some_and(|r| r.owner_id == *owner_id);
        if owned {
            tables.cards.remove(id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EncryptionKey;

    fn new_user(login: &str) -> NewUser {
        NewUser {
            login: login.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            encryption_key: EncryptionKey::generate().unwrap(),
        }
    }

    #[test]
    fn test_duplicate_login_rejected() {
        let storage = MemoryStorage::new();
        storage.insert_user(&new_user("alice")).unwrap();
        assert!(matches!(
            storage.insert_user(&new_user("alice")),
            Err(VaultError::DuplicateLogin(login)) if login == "alice"
        ));
    }

    #[test]
    fn test_select_user_returns_stored_key() {
        let storage = MemoryStorage::new();
        let user = new_user("alice");
        let id = storage.insert_user(&user).unwrap();

        let stored = storage.select_user("alice").unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.encryption_key.as_bytes(), user.encryption_key.as_bytes());
        assert!(storage.select_user("bob").unwrap().is_none());
    }

    #[test]
    fn test_scoped_select_and_delete() {
        let storage = MemoryStorage::new();
        let owner = storage.insert_user(&new_user("alice")).unwrap();
        let stranger = storage.insert_user(&new_user("bob")).unwrap();
        let id = RecordStore::<Text>::insert(
            &storage,
            &NewTextRecord {
                owner_id: owner,
                cipher_text: "c".to_string(),
            },
        )
        .unwrap();

        assert!(RecordStore::<Text>::select_by_id_and_owner(&storage, &id, &stranger)
            .unwrap()
            .is_none());
        assert!(!RecordStore::<Text>::delete_by_id_and_owner(&storage, &id, &stranger).unwrap());
        assert!(RecordStore::<Text>::delete_by_id_and_owner(&storage, &id, &owner).unwrap());
        assert_eq!(storage.record_count(), 0);
    }

    #[test]
    fn test_ids_unique_across_kinds() {
        let storage = MemoryStorage::new();
        let owner = storage.insert_user(&new_user("alice")).unwrap();
        let text_id = RecordStore::<Text>::insert(
            &storage,
            &NewTextRecord {
                owner_id: owner,
                cipher_text: "c".to_string(),
            },
        )
        .unwrap();
        let binary_id = RecordStore::<Binary>::insert(
            &storage,
            &NewBinaryRecord {
                owner_id: owner,
                filename: "f".to_string(),
                cipher_blob: "c".to_string(),
            },
        )
        .unwrap();
        assert_ne!(text_id, binary_id);

        // A text id never resolves as a binary record.
        assert!(RecordStore::<Binary>::select_by_id_and_owner(&storage, &text_id, &owner)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_record_for_unknown_owner_rejected() {
        let storage = MemoryStorage::new();
        let err = RecordStore::<Text>::insert(
            &storage,
            &NewTextRecord {
                owner_id: Uuid::new_v4(),
                cipher_text: "c".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, VaultError::Storage(_)));
        assert_eq!(storage.record_count(), 0);
    }

    #[test]
    fn test_card_keeps_sealed_timestamp() {
        let storage = MemoryStorage::new();
        let owner = storage.insert_user(&new_user("alice")).unwrap();
        let created_at = Utc::now() - chrono::Duration::minutes(5);
        let id = RecordStore::<Card>::insert(
            &storage,
            &NewCardRecord {
                owner_id: owner,
                cipher_card_number: "n".to_string(),
                cardholder_name: "ALICE".to_string(),
                expiration_date: "01/30".to_string(),
                cipher_cvv: "c".to_string(),
                created_at,
            },
        )
        .unwrap();
        let card = RecordStore::<Card>::select_by_id_and_owner(&storage, &id, &owner)
            .unwrap()
            .unwrap();
        assert_eq!(card.created_at, created_at);
    }
}
