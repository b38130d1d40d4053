//! Note store contract and SQLite implementation.
//!
//! # Responsibility
//! - Own the lifecycle of the single storage handle (`open`/`close`).
//! - Provide insert/update/delete/query-all over the `note` table.
//!
//! # Invariants
//! - Every operation on a closed store fails with `RepoError::NotOpen` and
//!   writes nothing.
//! - `update` never touches `date`.
//! - `query_all` yields rows ordered by `_id ASC`.

use crate::db::contract::{
    COLUMN_DATE, COLUMN_DESCRIPTION, COLUMN_ID, COLUMN_TITLE, NOTE_COLUMNS, TABLE_NAME,
};
use crate::db::{open_db, open_db_in_memory};
use crate::model::note::{Note, NoteFields, NoteId};
use crate::repo::row_mapper::map_rows;
use crate::repo::{RepoError, RepoResult};
use log::{debug, error, info, warn};
use rusqlite::{params, Connection, Rows};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

/// Returned by [`NoteRepository::insert`] when the row was not written.
pub const INSERT_FAILED: NoteId = -1;

/// Where the store keeps its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    /// Private in-memory database; contents are lost on `close()`.
    Memory,
}

/// Persistence contract for notes.
pub trait NoteRepository {
    /// Inserts one row and returns its id, or a non-positive value when
    /// nothing was written.
    fn insert(&self, fields: &NoteFields, date: &str) -> RepoResult<NoteId>;
    /// Rewrites title/description of one row; returns rows affected.
    fn update(&self, id: NoteId, fields: &NoteFields) -> RepoResult<usize>;
    /// Deletes one row; returns rows affected.
    fn delete_by_id(&self, id: NoteId) -> RepoResult<usize>;
    /// Runs `consume` over the full result set in store order.
    ///
    /// The row sequence is finite and only valid inside `consume`; call again
    /// to restart it.
    fn query_all<T, F>(&self, consume: F) -> RepoResult<T>
    where
        F: FnOnce(&mut Rows<'_>) -> RepoResult<T>;

    /// Loads every note through the row mapper.
    fn load_notes(&self) -> RepoResult<Vec<Note>> {
        self.query_all(map_rows)
    }
}

/// SQLite-backed note store with an explicit open/close lifecycle.
#[derive(Debug)]
pub struct SqliteNoteStore {
    location: StoreLocation,
    conn: Option<Connection>,
}

impl SqliteNoteStore {
    /// Creates a closed store for `location`.
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            conn: None,
        }
    }

    /// Creates a closed store backed by a database file.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::new(StoreLocation::File(path.as_ref().to_path_buf()))
    }

    /// Creates a closed store backed by a private in-memory database.
    pub fn in_memory() -> Self {
        Self::new(StoreLocation::Memory)
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Acquires the storage handle, creating the table if absent.
    ///
    /// Opening an already open store is a no-op.
    ///
    /// # Errors
    /// - `RepoError::Unavailable` when the file cannot be opened or carries a
    ///   newer schema version.
    pub fn open(&mut self) -> RepoResult<()> {
        if self.conn.is_some() {
            return Ok(());
        }

        let conn = match &self.location {
            StoreLocation::File(path) => open_db(path),
            StoreLocation::Memory => open_db_in_memory(),
        }
        .map_err(|err| match RepoError::from(err) {
            RepoError::Db(inner) => RepoError::Unavailable(inner),
            other => other,
        })?;

        self.conn = Some(conn);
        Ok(())
    }

    /// Releases the storage handle. Closing a closed store is a no-op.
    pub fn close(&mut self) -> RepoResult<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        match conn.close() {
            Ok(()) => {
                info!("event=store_close module=repo status=ok");
                Ok(())
            }
            Err((_conn, err)) => {
                // The connection is dropped here, which releases it anyway.
                error!("event=store_close module=repo status=error error={err}");
                Err(err.into())
            }
        }
    }

    /// Opens the store and returns a guard that closes it when dropped.
    pub fn scoped(&mut self) -> RepoResult<OpenStore<'_>> {
        self.open()?;
        Ok(OpenStore { store: self })
    }

    fn conn(&self) -> RepoResult<&Connection> {
        self.conn.as_ref().ok_or(RepoError::NotOpen)
    }
}

impl NoteRepository for SqliteNoteStore {
    fn insert(&self, fields: &NoteFields, date: &str) -> RepoResult<NoteId> {
        let conn = self.conn()?;
        let changed = conn.execute(
            &format!(
                "INSERT INTO {TABLE_NAME} ({COLUMN_TITLE}, {COLUMN_DESCRIPTION}, {COLUMN_DATE})
                 VALUES (?1, ?2, ?3);"
            ),
            params![fields.title(), fields.description(), date],
        )?;

        if changed == 0 {
            warn!("event=note_insert module=repo status=error error_code=no_row_written");
            return Ok(INSERT_FAILED);
        }

        let id = conn.last_insert_rowid();
        debug!("event=note_insert module=repo status=ok id={id}");
        Ok(id)
    }

    fn update(&self, id: NoteId, fields: &NoteFields) -> RepoResult<usize> {
        let changed = self.conn()?.execute(
            &format!(
                "UPDATE {TABLE_NAME}
                 SET {COLUMN_TITLE} = ?1, {COLUMN_DESCRIPTION} = ?2
                 WHERE {COLUMN_ID} = ?3;"
            ),
            params![fields.title(), fields.description(), id],
        )?;

        debug!("event=note_update module=repo status=ok id={id} rows_affected={changed}");
        Ok(changed)
    }

    fn delete_by_id(&self, id: NoteId) -> RepoResult<usize> {
        let changed = self.conn()?.execute(
            &format!("DELETE FROM {TABLE_NAME} WHERE {COLUMN_ID} = ?1;"),
            [id],
        )?;

        debug!("event=note_delete module=repo status=ok id={id} rows_affected={changed}");
        Ok(changed)
    }

    fn query_all<T, F>(&self, consume: F) -> RepoResult<T>
    where
        F: FnOnce(&mut Rows<'_>) -> RepoResult<T>,
    {
        let mut stmt = self.conn()?.prepare(&format!(
            "SELECT {} FROM {TABLE_NAME} ORDER BY {COLUMN_ID} ASC;",
            NOTE_COLUMNS.join(", ")
        ))?;
        let mut rows = stmt.query([])?;
        consume(&mut rows)
    }
}

/// Open store that closes itself on every exit path.
#[derive(Debug)]
pub struct OpenStore<'s> {
    store: &'s mut SqliteNoteStore,
}

impl OpenStore<'_> {
    /// Closes now and reports the outcome instead of logging it on drop.
    pub fn close(self) -> RepoResult<()> {
        let mut this = std::mem::ManuallyDrop::new(self);
        this.store.close()
    }
}

impl Deref for OpenStore<'_> {
    type Target = SqliteNoteStore;

    fn deref(&self) -> &Self::Target {
        self.store
    }
}

impl DerefMut for OpenStore<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.store
    }
}

impl Drop for OpenStore<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.store.close() {
            warn!("event=store_close module=repo status=error scope=guard error={err}");
        }
    }
}

/// Opens a store for `location`, runs `f`, and closes it whatever `f` returns.
pub fn with_open_store<T>(
    location: StoreLocation,
    f: impl FnOnce(&SqliteNoteStore) -> RepoResult<T>,
) -> RepoResult<T> {
    let mut store = SqliteNoteStore::new(location);
    let open = store.scoped()?;
    let result = f(&open);
    let closed = open.close();
    let value = result?;
    closed?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{with_open_store, NoteRepository, SqliteNoteStore, StoreLocation};
    use crate::model::note::NoteFields;
    use crate::repo::RepoError;

    fn fields(title: &str, description: &str) -> NoteFields {
        NoteFields::new(title, description).unwrap()
    }

    #[test]
    fn closed_store_rejects_every_operation() {
        let store = SqliteNoteStore::in_memory();
        assert!(matches!(
            store.insert(&fields("a", ""), "2024/01/01 00:00:00"),
            Err(RepoError::NotOpen)
        ));
        assert!(matches!(store.update(1, &fields("a", "")), Err(RepoError::NotOpen)));
        assert!(matches!(store.delete_by_id(1), Err(RepoError::NotOpen)));
        assert!(matches!(store.load_notes(), Err(RepoError::NotOpen)));
    }

    #[test]
    fn open_and_close_are_idempotent() {
        let mut store = SqliteNoteStore::in_memory();
        store.open().unwrap();
        store.open().unwrap();
        assert!(store.is_open());
        store.close().unwrap();
        store.close().unwrap();
        assert!(!store.is_open());
    }

    #[test]
    fn scoped_guard_closes_on_drop() {
        let mut store = SqliteNoteStore::in_memory();
        {
            let open = store.scoped().unwrap();
            assert!(open.is_open());
        }
        assert!(!store.is_open());
    }

    #[test]
    fn scoped_guard_closes_on_early_error_return() {
        fn failing(store: &mut SqliteNoteStore) -> Result<(), RepoError> {
            let open = store.scoped()?;
            open.update(1, &NoteFields::new("t", "").unwrap())?;
            Err(RepoError::SchemaMismatch("forced".to_string()))
        }

        let mut store = SqliteNoteStore::in_memory();
        assert!(failing(&mut store).is_err());
        assert!(!store.is_open());
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let mut store = SqliteNoteStore::in_memory();
        store.open().unwrap();
        let first = store.insert(&fields("a", ""), "2024/01/01 00:00:00").unwrap();
        let second = store.insert(&fields("b", ""), "2024/01/01 00:00:01").unwrap();
        assert!(first > 0);
        assert!(second > first);
    }

    #[test]
    fn update_and_delete_report_rows_affected() {
        let mut store = SqliteNoteStore::in_memory();
        store.open().unwrap();
        let id = store.insert(&fields("a", ""), "2024/01/01 00:00:00").unwrap();

        assert_eq!(store.update(id, &fields("b", "x")).unwrap(), 1);
        assert_eq!(store.update(id + 100, &fields("b", "x")).unwrap(), 0);
        assert_eq!(store.delete_by_id(id + 100).unwrap(), 0);
        assert_eq!(store.delete_by_id(id).unwrap(), 1);
        assert_eq!(store.delete_by_id(id).unwrap(), 0);
    }

    #[test]
    fn with_open_store_propagates_result_and_closes() {
        let count = with_open_store(StoreLocation::Memory, |store| {
            store.insert(&fields("a", ""), "2024/01/01 00:00:00")?;
            Ok(store.load_notes()?.len())
        })
        .unwrap();
        assert_eq!(count, 1);

        let err = with_open_store(StoreLocation::Memory, |_| -> Result<(), RepoError> {
            Err(RepoError::NotOpen)
        })
        .unwrap_err();
        assert!(matches!(err, RepoError::NotOpen));
    }

    #[test]
    fn unopenable_path_is_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SqliteNoteStore::file(dir.path().join("missing").join("notes.db"));
        let err = store.open().unwrap_err();
        assert!(err.is_storage_unavailable(), "unexpected error: {err}");
        assert!(!store.is_open());
    }
}
