//! Note use-case service.
//!
//! # Responsibility
//! - Expose the boundary operations `create`, `edit`, `remove`, `load_all`.
//! - Validate input before it reaches the store.
//! - Stamp creation dates at the persistence boundary.
//!
//! # Invariants
//! - Rows affected decide success: insert `<= 0` is a failure, update or
//!   delete `0` is `WriteOutcome::NotFound`.
//! - `edit` never changes a note's date.

use crate::clock::{format_note_date, Clock, SystemClock};
use crate::model::note::{Note, NoteFields, NoteId, NoteValidationError};
use crate::repo::note_store::NoteRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Result of an update or delete addressed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// At least one row was affected.
    Applied,
    /// No row had the requested id.
    NotFound,
}

impl WriteOutcome {
    fn from_rows_affected(changed: usize) -> Self {
        if changed > 0 {
            Self::Applied
        } else {
            Self::NotFound
        }
    }
}

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Input rejected before reaching the store.
    Validation(NoteValidationError),
    /// The store reported a non-positive id for an insert.
    InsertRejected(NoteId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InsertRejected(id) => write!(f, "insert was not applied (store returned {id})"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InsertRejected(_) => None,
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Note service facade over a repository implementation.
pub struct NoteService<R: NoteRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service that dates notes with the wall clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock))
    }

    pub fn with_clock(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn repo_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    pub fn into_repo(self) -> R {
        self.repo
    }

    /// Persists a new note and returns it with its assigned id and date.
    pub fn create(&self, title: &str, description: &str) -> Result<Note, NoteServiceError> {
        let fields = NoteFields::new(title, description)?;
        let date = format_note_date(self.clock.now());

        let id = self.repo.insert(&fields, &date)?;
        if id <= 0 {
            warn!("event=note_create module=service status=error error_code=insert_rejected");
            return Err(NoteServiceError::InsertRejected(id));
        }

        info!("event=note_create module=service status=ok id={id}");
        Ok(Note::persisted(id, fields, date))
    }

    /// Rewrites title and description of the note with `id`.
    pub fn edit(
        &self,
        id: NoteId,
        title: &str,
        description: &str,
    ) -> Result<WriteOutcome, NoteServiceError> {
        let fields = NoteFields::new(title, description)?;
        let outcome = WriteOutcome::from_rows_affected(self.repo.update(id, &fields)?);
        info!("event=note_edit module=service status=ok id={id} outcome={outcome:?}");
        Ok(outcome)
    }

    /// Deletes the note with `id`.
    pub fn remove(&self, id: NoteId) -> Result<WriteOutcome, NoteServiceError> {
        let outcome = WriteOutcome::from_rows_affected(self.repo.delete_by_id(id)?);
        info!("event=note_remove module=service status=ok id={id} outcome={outcome:?}");
        Ok(outcome)
    }

    /// Loads every note in store order.
    pub fn load_all(&self) -> Result<Vec<Note>, NoteServiceError> {
        let notes = self.repo.load_notes()?;
        info!("event=note_load module=service status=ok count={}", notes.len());
        Ok(notes)
    }
}
