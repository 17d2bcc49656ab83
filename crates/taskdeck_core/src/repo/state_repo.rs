//! State record repository contract and SQLite implementation.
//!
//! # Invariants
//! - Write paths upsert by key; there is never more than one row per key.
//! - Read paths return `None` for keys that were never written.

use crate::db::DbError;
use crate::model::now_epoch_ms;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Fixed names of the durable records, one per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StorageKey {
    Todos,
    Categories,
    Profile,
    Auth,
    Theme,
}

impl StorageKey {
    pub const ALL: [StorageKey; 5] = [
        StorageKey::Todos,
        StorageKey::Categories,
        StorageKey::Profile,
        StorageKey::Auth,
        StorageKey::Theme,
    ];

    /// Record name used as the storage key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todos => "todo-storage",
            Self::Categories => "category-storage",
            Self::Profile => "profile-storage",
            Self::Auth => "auth-storage",
            Self::Theme => "theme-storage",
        }
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage-layer error.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Backend cannot be reached (e.g. a poisoned in-memory lock).
    Unavailable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(details) => write!(f, "state storage unavailable: {details}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key/value access to persisted store snapshots.
///
/// `Send` so a repository can be moved onto the persistence writer thread.
pub trait StateRepository: Send {
    fn load_record(&self, key: StorageKey) -> RepoResult<Option<String>>;
    fn save_record(&mut self, key: StorageKey, value: &str) -> RepoResult<()>;
}

/// SQLite-backed state repository owning its connection.
pub struct SqliteStateRepository {
    conn: Connection,
}

impl SqliteStateRepository {
    /// Wraps a connection returned by `db::open_db` / `db::open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Borrows the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl StateRepository for SqliteStateRepository {
    fn load_record(&self, key: StorageKey) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM state_records WHERE key = ?1;",
                [key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save_record(&mut self, key: StorageKey, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO state_records (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key.as_str(), value, now_epoch_ms()],
        )?;
        Ok(())
    }
}
