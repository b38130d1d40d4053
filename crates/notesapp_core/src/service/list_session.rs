//! List-view session over one store handle and one in-memory mirror.
//!
//! # Responsibility
//! - Route list-view actions to the store first, then to the mirror.
//! - Own the session's store handle and close it when the session ends.
//! - Provide the user-facing notice text for each outcome.
//!
//! # Invariants
//! - The mirror is patched only after the store confirmed the write.
//! - A failed or not-found store write leaves the mirror untouched.
//! - Edit/remove are addressed by list position; the id comes from the note
//!   held at that position.
//! - A store write and its mirror patch happen under one store lock, so a
//!   concurrent load never overwrites a confirmed write. Listeners must not
//!   call back into the session.

use crate::model::note::{Note, NoteFields};
use crate::reconciler::{ListChangeListener, NoteListReconciler, ReconcileError};
use crate::repo::note_store::NoteRepository;
use crate::service::loader::{load_into, LoadError, LoadOutcome, LoadingIndicator};
use crate::service::note_service::{NoteService, NoteServiceError, WriteOutcome};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

/// Short, non-blocking message shown after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Added,
    Updated,
    Deleted,
    AddFailed,
    UpdateFailed,
    DeleteFailed,
    /// A load finished with no notes.
    EmptyList,
}

impl Notice {
    pub fn text(self) -> &'static str {
        match self {
            Self::Added => "1 item successfully added",
            Self::Updated => "1 item successfully updated",
            Self::Deleted => "1 item successfully deleted",
            Self::AddFailed => "Fail to add data",
            Self::UpdateFailed => "Fail to update data",
            Self::DeleteFailed => "Failed to delete Note",
            Self::EmptyList => "Create some note!",
        }
    }

    /// Notice for a finished load, if one should be shown.
    pub fn after_load(outcome: LoadOutcome) -> Option<Self> {
        match outcome {
            LoadOutcome::Applied { count: 0 } => Some(Self::EmptyList),
            LoadOutcome::Applied { .. } | LoadOutcome::Discarded => None,
        }
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// Failure of a session action.
#[derive(Debug)]
pub enum SessionError {
    Service(NoteServiceError),
    Reconcile(ReconcileError),
    /// A previous holder of the store or list lock panicked.
    Poisoned,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::Reconcile(err) => write!(f, "{err}"),
            Self::Poisoned => write!(f, "note state lock poisoned"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            Self::Reconcile(err) => Some(err),
            Self::Poisoned => None,
        }
    }
}

impl From<NoteServiceError> for SessionError {
    fn from(value: NoteServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<ReconcileError> for SessionError {
    fn from(value: ReconcileError) -> Self {
        Self::Reconcile(value)
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// One viewing session of the notes list.
pub struct NoteListSession<R: NoteRepository> {
    service: Arc<Mutex<NoteService<R>>>,
    list: Arc<Mutex<NoteListReconciler>>,
}

impl<R> NoteListSession<R>
where
    R: NoteRepository + Send + 'static,
{
    /// Starts a session over an already opened store.
    pub fn new(service: NoteService<R>) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
            list: Arc::new(Mutex::new(NoteListReconciler::new())),
        }
    }

    /// Installs the renderer hook on the session's mirror.
    pub fn set_listener(&self, listener: impl ListChangeListener + 'static) -> SessionResult<()> {
        self.list()?.set_listener(listener);
        Ok(())
    }

    /// Loads every note into the mirror, showing `indicator` meanwhile.
    pub async fn load(&self, indicator: &dyn LoadingIndicator) -> Result<LoadOutcome, LoadError> {
        load_into(
            Arc::clone(&self.service),
            Arc::downgrade(&self.list),
            indicator,
        )
        .await
    }

    /// Starts a load on the current runtime.
    ///
    /// The task keeps only a weak reference to the mirror: if the session is
    /// dropped before the load finishes, the result is discarded.
    pub fn spawn_load(
        &self,
        indicator: Arc<dyn LoadingIndicator>,
    ) -> JoinHandle<Result<LoadOutcome, LoadError>> {
        let service = Arc::clone(&self.service);
        let list = Arc::downgrade(&self.list);
        tokio::spawn(async move { load_into(service, list, indicator.as_ref()).await })
    }

    /// Restores a saved mirror instead of reloading from the store.
    pub fn restore(&self, snapshot: &str) -> SessionResult<()> {
        Ok(self.list()?.restore_snapshot(snapshot)?)
    }

    /// Serializes the mirror for instance-state saving.
    pub fn snapshot(&self) -> SessionResult<String> {
        Ok(self.list()?.to_snapshot()?)
    }

    pub fn count(&self) -> SessionResult<usize> {
        Ok(self.list()?.count())
    }

    /// Copy of the mirror's current contents.
    pub fn notes(&self) -> SessionResult<Vec<Note>> {
        Ok(self.list()?.items().to_vec())
    }

    /// Inserts a note, then appends it to the mirror.
    pub fn create(&self, title: &str, description: &str) -> SessionResult<Note> {
        let service = self.service()?;
        let note = service.create(title, description)?;
        self.list()?.add_item(note.clone())?;
        Ok(note)
    }

    /// Edits the note at `index`; the mirror is patched only when applied.
    pub fn edit(&self, index: usize, title: &str, description: &str) -> SessionResult<WriteOutcome> {
        let service = self.service()?;
        let current = self.note_at(index)?;
        let Some(id) = current.id else {
            return Err(ReconcileError::UnsavedDraft.into());
        };

        let outcome = service.edit(id, title, description)?;
        if outcome == WriteOutcome::Applied {
            let fields = NoteFields::new(title, description)
                .map_err(NoteServiceError::Validation)?;
            self.list()?.update_item(index, current.with_fields(fields))?;
        }
        Ok(outcome)
    }

    /// Deletes the note at `index`; the mirror is patched only when applied.
    pub fn remove(&self, index: usize) -> SessionResult<WriteOutcome> {
        let service = self.service()?;
        let current = self.note_at(index)?;
        let Some(id) = current.id else {
            return Err(ReconcileError::UnsavedDraft.into());
        };

        let outcome = service.remove(id)?;
        if outcome == WriteOutcome::Applied {
            self.list()?.remove_item(index)?;
        }
        Ok(outcome)
    }

    /// Ends the session and returns the store so the caller can close it.
    ///
    /// Returns `None` while a spawned load still holds the store.
    pub fn finish(self) -> Option<R> {
        let service = Arc::try_unwrap(self.service).ok()?;
        match service.into_inner() {
            Ok(service) => Some(service.into_repo()),
            Err(poisoned) => {
                warn!("event=session_finish module=session status=error error_code=store_lock_poisoned");
                Some(poisoned.into_inner().into_repo())
            }
        }
    }

    fn note_at(&self, index: usize) -> SessionResult<Note> {
        let list = self.list()?;
        list.get(index)
            .cloned()
            .ok_or_else(|| {
                ReconcileError::IndexOutOfRange {
                    index,
                    len: list.count(),
                }
                .into()
            })
    }

    fn service(&self) -> SessionResult<MutexGuard<'_, NoteService<R>>> {
        self.service.lock().map_err(|_| SessionError::Poisoned)
    }

    fn list(&self) -> SessionResult<MutexGuard<'_, NoteListReconciler>> {
        self.list.lock().map_err(|_| SessionError::Poisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteListSession, Notice, SessionError};
    use crate::clock::FixedClock;
    use crate::reconciler::{ListChange, ReconcileError};
    use crate::repo::note_store::SqliteNoteStore;
    use crate::service::loader::LoadOutcome;
    use crate::service::note_service::{NoteService, WriteOutcome};
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};

    fn session() -> NoteListSession<SqliteNoteStore> {
        let instant = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_opt(10, 0, 0))
            .unwrap();
        let mut store = SqliteNoteStore::in_memory();
        store.open().unwrap();
        NoteListSession::new(NoteService::with_clock(store, Arc::new(FixedClock(instant))))
    }

    #[test]
    fn create_appends_to_mirror() {
        let session = session();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        session
            .set_listener(move |change: ListChange| sink.lock().unwrap().push(change))
            .unwrap();

        let note = session.create("Groceries", "Milk").unwrap();

        assert_eq!(session.notes().unwrap(), vec![note]);
        assert_eq!(*log.lock().unwrap(), vec![ListChange::Inserted(0)]);
    }

    #[test]
    fn failed_validation_leaves_mirror_untouched() {
        let session = session();
        assert!(matches!(
            session.create(" ", "x"),
            Err(SessionError::Service(_))
        ));
        assert_eq!(session.count().unwrap(), 0);
    }

    #[test]
    fn edit_patches_mirror_and_keeps_date() {
        let session = session();
        let created = session.create("Groceries", "Milk").unwrap();

        assert_eq!(
            session.edit(0, "Groceries", "Milk, bread").unwrap(),
            WriteOutcome::Applied
        );

        let notes = session.notes().unwrap();
        assert_eq!(notes[0].description, "Milk, bread");
        assert_eq!(notes[0].date, created.date);
        assert_eq!(notes[0].id, created.id);
    }

    #[test]
    fn edit_of_row_deleted_elsewhere_reports_not_found() {
        let session = session();
        let created = session.create("a", "").unwrap();
        session
            .service()
            .unwrap()
            .remove(created.id.unwrap())
            .unwrap();

        assert_eq!(session.edit(0, "b", "").unwrap(), WriteOutcome::NotFound);
        assert_eq!(session.notes().unwrap()[0].title, "a");
    }

    #[test]
    fn remove_out_of_range_touches_nothing() {
        let session = session();
        session.create("a", "").unwrap();

        assert!(matches!(
            session.remove(3),
            Err(SessionError::Reconcile(ReconcileError::IndexOutOfRange { index: 3, len: 1 }))
        ));
        assert_eq!(session.count().unwrap(), 1);
    }

    #[test]
    fn remove_drops_row_and_mirror_entry() {
        let session = session();
        session.create("a", "").unwrap();
        session.create("b", "").unwrap();

        assert_eq!(session.remove(0).unwrap(), WriteOutcome::Applied);

        let notes = session.notes().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "b");
    }

    #[test]
    fn snapshot_round_trips_through_restore() {
        let session = session();
        session.create("a", "1").unwrap();
        let snapshot = session.snapshot().unwrap();

        let other = self::session();
        other.restore(&snapshot).unwrap();
        assert_eq!(other.notes().unwrap(), session.notes().unwrap());
    }

    #[test]
    fn finish_returns_store_for_closing() {
        let session = session();
        let mut store = session.finish().unwrap();
        assert!(store.is_open());
        store.close().unwrap();
    }

    #[test]
    fn notice_texts() {
        assert_eq!(Notice::Added.text(), "1 item successfully added");
        assert_eq!(Notice::DeleteFailed.to_string(), "Failed to delete Note");
        assert_eq!(
            Notice::after_load(LoadOutcome::Applied { count: 0 }),
            Some(Notice::EmptyList)
        );
        assert_eq!(Notice::after_load(LoadOutcome::Applied { count: 2 }), None);
        assert_eq!(Notice::after_load(LoadOutcome::Discarded), None);
    }
}
