//! SQLite storage bootstrap for the notes table.
//!
//! # Responsibility
//! - Open and configure SQLite connections.
//! - Create the notes table when absent.
//! - Publish the static table/column contract.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No note data is read or written before the schema step succeeds.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod contract;
pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while bringing a connection into a usable state.
#[derive(Debug)]
pub enum DbError {
    /// SQLite refused to open the file or memory database.
    Connect(rusqlite::Error),
    /// A configuration or schema statement failed.
    Sqlite(rusqlite::Error),
    /// The file was stamped by a newer build of the app.
    SchemaTooNew { found: u32, supported: u32 },
}

impl DbError {
    pub(crate) fn sqlite(&self) -> Option<&rusqlite::Error> {
        match self {
            Self::Connect(err) | Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect(err) => write!(f, "cannot open note database: {err}"),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "note database has schema version {found}, this build supports up to {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.sqlite().map(|err| err as &(dyn Error + 'static))
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
