//! Persistence contracts and the SQLite note store.
//!
//! # Responsibility
//! - Own the persisted representation of notes.
//! - Translate raw result rows into domain records.
//!
//! # Invariants
//! - "Not found" is reported as zero rows affected, never as an error.
//! - An unopened or broken store handle is an explicit error.
//! - Row shape mismatches surface as `RepoError::SchemaMismatch`.

pub mod note_store;
pub mod row_mapper;

use crate::db::DbError;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Store-level error for note persistence.
#[derive(Debug)]
pub enum RepoError {
    /// The store handle was used before `open()` or after `close()`.
    NotOpen,
    /// The backing file is missing, unreadable, read-only or corrupted.
    Unavailable(DbError),
    /// Persisted rows do not have the expected columns or types.
    SchemaMismatch(String),
    /// Any other SQLite failure.
    Db(DbError),
}

impl RepoError {
    /// Returns whether the failure means the storage cannot be used at all.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Self::NotOpen | Self::Unavailable(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOpen => write!(f, "note store is not open"),
            Self::Unavailable(err) => write!(f, "note storage unavailable: {err}"),
            Self::SchemaMismatch(message) => write!(f, "note schema mismatch: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(err) | Self::Db(err) => Some(err),
            Self::NotOpen | Self::SchemaMismatch(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            unusable @ (DbError::Connect(_) | DbError::SchemaTooNew { .. }) => {
                Self::Unavailable(unusable)
            }
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::InvalidColumnName(_)
            | rusqlite::Error::InvalidColumnIndex(_)
            | rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::IntegralValueOutOfRange(..) => {
                return Self::SchemaMismatch(value.to_string());
            }
            rusqlite::Error::SqliteFailure(_, Some(message))
                if message.starts_with("no such table")
                    || message.starts_with("no such column") =>
            {
                return Self::SchemaMismatch(message.clone());
            }
            _ => {}
        }

        match value.sqlite_error_code() {
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::ReadOnly
                | ErrorCode::PermissionDenied
                | ErrorCode::SystemIoFailure,
            ) => Self::Unavailable(DbError::Sqlite(value)),
            _ => Self::Db(DbError::Sqlite(value)),
        }
    }
}
