//! SQLite storage engine for pet records.
//!
//! # Responsibility
//! - Open and configure SQLite connections, applying schema migrations.
//! - Execute table-level query/insert/update/delete calls for the provider.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No pet data is read or written before migrations succeed.
//! - One connection per storage handle, opened lazily and reused.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod cursor;
pub mod migrations;
mod open;
mod storage;

pub use cursor::{CursorRow, PetCursor};
pub use open::{open_db, open_db_in_memory};
pub use storage::{SqliteStorage, StorageEngine, StorageTarget};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Persisted or projected data cannot be mapped to the pet model.
    InvalidData(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::InvalidData(message) => write!(f, "invalid pet data: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
