//! Storage abstraction for Vault.
//!
//! The storage layer is the only place record identity and ownership are
//! enforced:
//! - Ids are generated atomically at insert
//! - Reads and deletes are scoped to `(id, owner_id)`
//!
//! Backends:
//! - `SqliteStorage`: SQLite via rusqlite (file or in-memory)
//! - `MemoryStorage`: lock-guarded maps, for tests and embedding

pub mod memory;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export public types
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;
pub use traits::{RecordStore, StorageEngine, UserStore};
pub use types::{
    BinaryRecord, CardRecord, NewBinaryRecord, NewCardRecord, NewTextRecord, NewUser, TextRecord,
    User,
};
