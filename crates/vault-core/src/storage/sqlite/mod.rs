//! SQLite storage backend.
//!
//! One connection behind a mutex. Record ids are generated here and every
//! scoped query filters on `id` and `owner_id` in the same statement.

mod row;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{ffi, params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::{Result, VaultError};
use crate::records::{Binary, Card, Text};
use crate::storage::traits::{RecordStore, UserStore};
use crate::storage::types::{
    BinaryRecord, CardRecord, NewBinaryRecord, NewCardRecord, NewTextRecord, NewUser, TextRecord,
    User,
};

use row::{BinaryRow, CardRow, TextRow, UserRow};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        login TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        encryption_key TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS text_records (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        cipher_text TEXT NOT NULL,

        FOREIGN KEY(owner_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS binary_records (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        filename TEXT NOT NULL,
        cipher_blob TEXT NOT NULL,

        FOREIGN KEY(owner_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS card_records (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        cipher_card_number TEXT NOT NULL,
        cardholder_name TEXT NOT NULL,
        expiration_date TEXT NOT NULL,
        cipher_cvv TEXT NOT NULL,
        created_at TEXT NOT NULL,

        FOREIGN KEY(owner_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS text_records_owner ON text_records (owner_id);
    CREATE INDEX IF NOT EXISTS binary_records_owner ON binary_records (owner_id);
    CREATE INDEX IF NOT EXISTS card_records_owner ON card_records (owner_id);
"#;

/// SQLite storage engine.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open (or create) a database file and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| VaultError::Storage("SQLite connection poisoned".to_string()))
    }

    fn delete_scoped(&self, table: &str, id: &Uuid, owner_id: &Uuid) -> Result<bool> {
        let conn = self.lock_conn()?;
        let affected = conn.execute(
            &format!("DELETE FROM {} WHERE id = ? AND owner_id = ?", table),
            [id.to_string(), owner_id.to_string()],
        )?;
        Ok(affected > 0)
    }
}

/// Only UNIQUE failures; NOT NULL, primary key and foreign key failures
/// stay storage errors.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl UserStore for SqliteStorage {
    fn insert_user(&self, user: &NewUser) -> Result<Uuid> {
        let conn = self.lock_conn()?;
        let id = Uuid::new_v4();

        let result = conn.execute(
            "INSERT INTO users (id, login, password_hash, encryption_key, created_at) VALUES (?, ?, ?, ?, ?)",
            params![
                id.to_string(),
                user.login,
                user.password_hash,
                user.encryption_key.to_base64(),
                Utc::now().to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(id),
            Err(e) if is_unique_violation(&e) => Err(VaultError::DuplicateLogin(user.login.clone())),
            Err(e) => Err(e.into()),
        }
    }

    fn select_user(&self, login: &str) -> Result<Option<User>> {
        let conn = self.lock_conn()?;

        let row = conn
            .query_row(
                r#"
                SELECT id, login, password_hash, encryption_key, created_at
                FROM users
                WHERE login = ?
                "#,
                [login],
                |row| {
                    Ok(UserRow {
                        id: row.get(0)?,
                        login: row.get(1)?,
                        password_hash: row.get(2)?,
                        encryption_key: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?;

        row.map(User::try_from).transpose()
    }
}

impl RecordStore<Text> for SqliteStorage {
    fn insert(&self, record: &NewTextRecord) -> Result<Uuid> {
        let conn = self.lock_conn()?;
        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO text_records (id, owner_id, cipher_text) VALUES (?, ?, ?)",
            params![id.to_string(), record.owner_id.to_string(), record.cipher_text],
        )?;
        Ok(id)
    }

    fn select_by_id_and_owner(&self, id: &Uuid, owner_id: &Uuid) -> Result<Option<TextRecord>> {
        let conn = self.lock_conn()?;

        let result = conn.query_row(
            r#"
            SELECT id, owner_id, cipher_text
            FROM text_records
            WHERE id = ? AND owner_id = ?
            "#,
            [id.to_string(), owner_id.to_string()],
            |row| {
                Ok(TextRow {
                    id: row.get(0)?,
                    owner_id: row.get(1)?,
                    cipher_text: row.get(2)?,
                })
            },
        );

        match result {
            Ok(row) => Ok(Some(row.try_into()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete_by_id_and_owner(&self, id: &Uuid, owner_id: &Uuid) -> Result<bool> {
        self.delete_scoped("text_records", id, owner_id)
    }
}

impl RecordStore<Binary> for SqliteStorage {
    fn insert(&self, record: &NewBinaryRecord) -> Result<Uuid> {
        let conn = self.lock_conn()?;
        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO binary_records (id, owner_id, filename, cipher_blob) VALUES (?, ?, ?, ?)",
            params![
                id.to_string(),
                record.owner_id.to_string(),
                record.filename,
                record.cipher_blob,
            ],
        )?;
        Ok(id)
    }

    fn select_by_id_and_owner(&self, id: &Uuid, owner_id: &Uuid) -> Result<Option<BinaryRecord>> {
        let conn = self.lock_conn()?;

        let result = conn.query_row(
            r#"
            SELECT id, owner_id, filename, cipher_blob
            FROM binary_records
            WHERE id = ? AND owner_id = ?
            "#,
            [id.to_string(), owner_id.to_string()],
            |row| {
                Ok(BinaryRow {
                    id: row.get(0)?,
                    owner_id: row.get(1)?,
                    filename: row.get(2)?,
                    cipher_blob: row.get(3)?,
                })
            },
        );

        match result {
            Ok(row) => Ok(Some(row.try_into()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete_by_id_and_owner(&self, id: &Uuid, owner_id: &Uuid) -> Result<bool> {
        self.delete_scoped("binary_records", id, owner_id)
    }
}

impl RecordStore<Card> for SqliteStorage {
    fn insert(&self, record: &NewCardRecord) -> Result<Uuid> {
        let conn = self.lock_conn()?;
        let id = Uuid::new_v4();
        conn.execute(
            r#"
            INSERT INTO card_records
                (id, owner_id, cipher_card_number, cardholder_name, expiration_date, cipher_cvv, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                id.to_string(),
                record.owner_id.to_string(),
                record.cipher_card_number,
                record.cardholder_name,
                record.expiration_date,
                record.cipher_cvv,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(id)
    }

    fn select_by_id_and_owner(&self, id: &Uuid, owner_id: &Uuid) -> Result<Option<CardRecord>> {
        let conn = self.lock_conn()?;

        let result = conn.query_row(
            r#"
            SELECT id, owner_id, cipher_card_number, cardholder_name, expiration_date, cipher_cvv, created_at
            FROM card_records
            WHERE id = ? AND owner_id = ?
            "#,
            [id.to_string(), owner_id.to_string()],
            |row| {
                Ok(CardRow {
                    id: row.get(0)?,
                    owner_id: row.get(1)?,
                    cipher_card_number: row.get(2)?,
                    cardholder_name: row.get(3)?,
                    expiration_date: row.get(4)?,
                    cipher_cvv: row.get(5)?,
                    created_at: row.get(6)?,
                })
            },
        );

        match result {
            Ok(row) => Ok(Some(row.try_into()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete_by_id_and_owner(&self, id: &Uuid, owner_id: &Uuid) -> Result<bool> {
        self.delete_scoped("card_records", id, owner_id)
    }
}
