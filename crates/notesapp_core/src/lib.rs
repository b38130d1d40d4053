//! Core persistence and list reconciliation for the notes app.
//! This crate is the single source of truth for note invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod reconciler;
pub mod repo;
pub mod service;

pub use clock::{format_note_date, Clock, FixedClock, SystemClock, NOTE_DATE_FORMAT};
pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteFields, NoteId, NoteValidationError};
pub use reconciler::{ListChange, ListChangeListener, NoteListReconciler, ReconcileError};
pub use repo::note_store::{
    with_open_store, NoteRepository, OpenStore, SqliteNoteStore, StoreLocation, INSERT_FAILED,
};
pub use repo::row_mapper::map_rows;
pub use repo::{RepoError, RepoResult};
pub use service::list_session::{NoteListSession, Notice, SessionError, SessionResult};
pub use service::loader::{
    load_into, load_notes, LoadError, LoadOutcome, LoadingIndicator, NoIndicator,
};
pub use service::note_service::{NoteService, NoteServiceError, WriteOutcome};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
