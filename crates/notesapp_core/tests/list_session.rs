use chrono::NaiveDate;
use notesapp_core::{
    FixedClock, ListChange, LoadError, LoadOutcome, LoadingIndicator, NoIndicator,
    NoteListSession, NoteService, NoteServiceError, Notice, RepoError, SqliteNoteStore,
    WriteOutcome,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingIndicator {
    visible: AtomicBool,
    shown: AtomicUsize,
}

impl LoadingIndicator for RecordingIndicator {
    fn set_loading(&self, loading: bool) {
        if loading {
            self.shown.fetch_add(1, Ordering::SeqCst);
        }
        self.visible.store(loading, Ordering::SeqCst);
    }
}

fn fixed_service(store: SqliteNoteStore) -> NoteService<SqliteNoteStore> {
    let instant = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|date| date.and_hms_opt(10, 0, 0))
        .unwrap();
    NoteService::with_clock(store, Arc::new(FixedClock(instant)))
}

fn open_session(path: &std::path::Path) -> NoteListSession<SqliteNoteStore> {
    let mut store = SqliteNoteStore::file(path);
    store.open().unwrap();
    NoteListSession::new(fixed_service(store))
}

#[tokio::test]
async fn load_fills_mirror_and_clears_indicator() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");
    {
        let seed = open_session(&path);
        seed.create("first", "").unwrap();
        seed.create("second", "").unwrap();
    }

    let session = open_session(&path);
    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&changes);
    session
        .set_listener(move |change: ListChange| sink.lock().unwrap().push(change))
        .unwrap();
    let indicator = RecordingIndicator::default();

    let outcome = session.load(&indicator).await.unwrap();

    assert_eq!(outcome, LoadOutcome::Applied { count: 2 });
    assert_eq!(Notice::after_load(outcome), None);
    assert_eq!(indicator.shown.load(Ordering::SeqCst), 1);
    assert!(!indicator.visible.load(Ordering::SeqCst));
    assert_eq!(*changes.lock().unwrap(), vec![ListChange::Reset { len: 2 }]);

    let titles: Vec<String> = session
        .notes()
        .unwrap()
        .into_iter()
        .map(|note| note.title)
        .collect();
    assert_eq!(titles, vec!["first", "second"]);
}

#[tokio::test]
async fn empty_store_load_yields_empty_list_notice() {
    let dir = tempfile::tempdir().unwrap();
    let session = open_session(&dir.path().join("notes.db"));

    let outcome = session.load(&NoIndicator).await.unwrap();

    assert_eq!(outcome, LoadOutcome::Applied { count: 0 });
    assert_eq!(Notice::after_load(outcome), Some(Notice::EmptyList));
    assert_eq!(session.count().unwrap(), 0);
}

#[tokio::test]
async fn failed_load_still_clears_indicator() {
    let session = NoteListSession::new(fixed_service(SqliteNoteStore::in_memory()));
    let indicator = RecordingIndicator::default();

    let err = session.load(&indicator).await.unwrap_err();

    assert!(matches!(
        err,
        LoadError::Service(NoteServiceError::Repo(RepoError::NotOpen))
    ));
    assert_eq!(indicator.shown.load(Ordering::SeqCst), 1);
    assert!(!indicator.visible.load(Ordering::SeqCst));
}

#[tokio::test]
async fn load_finishing_after_session_drop_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let session = open_session(&dir.path().join("notes.db"));
    session.create("orphan", "").unwrap();
    let indicator = Arc::new(RecordingIndicator::default());

    let handle = session.spawn_load(indicator.clone());
    drop(session);

    let outcome = handle.await.unwrap().unwrap();
    assert_eq!(outcome, LoadOutcome::Discarded);
    assert!(!indicator.visible.load(Ordering::SeqCst));
}

#[tokio::test]
async fn mirror_tracks_groceries_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let session = open_session(&dir.path().join("notes.db"));
    session.load(&NoIndicator).await.unwrap();

    let created = session.create("Groceries", "Milk, eggs").unwrap();
    assert_eq!(created.id, Some(1));
    assert_eq!(session.count().unwrap(), 1);

    assert_eq!(
        session.edit(0, "Groceries", "Milk, eggs, bread").unwrap(),
        WriteOutcome::Applied
    );
    let mirrored = session.notes().unwrap();
    assert_eq!(mirrored[0].description, "Milk, eggs, bread");
    assert_eq!(mirrored[0].date.as_deref(), Some("2024/01/01 10:00:00"));

    session.load(&NoIndicator).await.unwrap();
    assert_eq!(session.notes().unwrap(), mirrored);

    assert_eq!(session.remove(0).unwrap(), WriteOutcome::Applied);
    assert_eq!(session.count().unwrap(), 0);
    session.load(&NoIndicator).await.unwrap();
    assert!(session.notes().unwrap().is_empty());

    let mut store = session.finish().unwrap();
    store.close().unwrap();
}

/// Runs a session action the moment the load hides its indicator.
struct MutateOnHide<'s, F>
where
    F: Fn(&NoteListSession<SqliteNoteStore>) -> WriteOutcome + Send + Sync,
{
    session: &'s NoteListSession<SqliteNoteStore>,
    action: F,
    outcome: Mutex<Option<WriteOutcome>>,
}

impl<F> LoadingIndicator for MutateOnHide<'_, F>
where
    F: Fn(&NoteListSession<SqliteNoteStore>) -> WriteOutcome + Send + Sync,
{
    fn set_loading(&self, loading: bool) {
        if !loading {
            *self.outcome.lock().unwrap() = Some((self.action)(self.session));
        }
    }
}

#[tokio::test]
async fn remove_confirmed_as_load_finishes_stays_removed() {
    let dir = tempfile::tempdir().unwrap();
    let session = open_session(&dir.path().join("notes.db"));
    session.create("X", "").unwrap();
    let indicator = MutateOnHide {
        session: &session,
        action: |session: &NoteListSession<SqliteNoteStore>| session.remove(0).unwrap(),
        outcome: Mutex::new(None),
    };

    let outcome = session.load(&indicator).await.unwrap();

    assert_eq!(outcome, LoadOutcome::Applied { count: 1 });
    assert_eq!(*indicator.outcome.lock().unwrap(), Some(WriteOutcome::Applied));
    assert!(session.notes().unwrap().is_empty());

    session.load(&NoIndicator).await.unwrap();
    assert!(session.notes().unwrap().is_empty());
}

#[tokio::test]
async fn create_confirmed_as_load_finishes_is_kept_once() {
    let dir = tempfile::tempdir().unwrap();
    let session = open_session(&dir.path().join("notes.db"));
    session.create("X", "").unwrap();
    let indicator = MutateOnHide {
        session: &session,
        action: |session: &NoteListSession<SqliteNoteStore>| {
            session.create("Y", "").unwrap();
            WriteOutcome::Applied
        },
        outcome: Mutex::new(None),
    };

    session.load(&indicator).await.unwrap();

    let titles: Vec<String> = session
        .notes()
        .unwrap()
        .into_iter()
        .map(|note| note.title)
        .collect();
    assert_eq!(titles, vec!["X", "Y"]);

    let mirrored = session.notes().unwrap();
    session.load(&NoIndicator).await.unwrap();
    assert_eq!(session.notes().unwrap(), mirrored);
}
