//! Runtime configuration for the notes core.
//!
//! Values come from environment variables so the host app can point the
//! core at its private data directory without code changes:
//!
//! - `NOTESAPP_DB_PATH`: database file (default `<temp>/notesapp.sqlite3`).
//! - `NOTESAPP_LOG_LEVEL`: `trace|debug|info|warn|error`.
//! - `NOTESAPP_LOG_DIR`: absolute directory for rolling logs; unset disables
//!   file logging.

use crate::logging::{default_log_level, init_logging};
use crate::repo::note_store::SqliteNoteStore;
use crate::repo::RepoResult;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "NOTESAPP_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "NOTESAPP_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NOTESAPP_LOG_DIR";
pub const DEFAULT_DB_FILE_NAME: &str = "notesapp.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            db_path: read(ENV_DB_PATH).map_or(defaults.db_path, PathBuf::from),
            log_level: read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        }
    }

    /// Returns a closed store for the configured database file.
    pub fn store(&self) -> SqliteNoteStore {
        SqliteNoteStore::file(&self.db_path)
    }

    /// Returns an opened store for the configured database file.
    pub fn open_store(&self) -> RepoResult<SqliteNoteStore> {
        let mut store = self.store();
        store.open()?;
        Ok(store)
    }

    /// Starts file logging when a log directory is configured.
    pub fn init_logging(&self) -> Result<(), String> {
        match self.log_dir.as_ref() {
            Some(dir) => init_logging(&self.log_level, &dir.to_string_lossy()),
            None => Ok(()),
        }
    }
}
