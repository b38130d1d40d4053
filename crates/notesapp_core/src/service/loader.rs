//! Off-thread note loading for list views.
//!
//! # Responsibility
//! - Run query-all, mapping and install on a blocking worker.
//! - Drive a loading indicator that is always cleared, including on error.
//! - Apply the result only if the receiving list still exists.
//!
//! # Invariants
//! - The indicator is hidden on every exit path, once the loaded notes are
//!   installed and no lock is held.
//! - Snapshot and install share one store-lock critical section; lock order
//!   is store, then list.
//! - A load that finishes after its list was dropped is discarded.

use crate::model::note::Note;
use crate::reconciler::{NoteListReconciler, ReconcileError};
use crate::repo::note_store::NoteRepository;
use crate::service::note_service::{NoteService, NoteServiceError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, Weak};
use tokio::task::JoinError;

/// Presentation hook shown while a load is in flight.
pub trait LoadingIndicator: Send + Sync {
    fn set_loading(&self, loading: bool);
}

/// Indicator for callers that render no progress UI.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIndicator;

impl LoadingIndicator for NoIndicator {
    fn set_loading(&self, _loading: bool) {}
}

/// Shows the indicator on creation and hides it on drop.
struct LoadingGuard<'a> {
    indicator: &'a dyn LoadingIndicator,
}

impl<'a> LoadingGuard<'a> {
    fn show(indicator: &'a dyn LoadingIndicator) -> Self {
        indicator.set_loading(true);
        Self { indicator }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.indicator.set_loading(false);
    }
}

/// What happened to a finished load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The list now mirrors `count` notes.
    Applied { count: usize },
    /// The list was dropped before the load finished.
    Discarded,
}

/// Failure of a background load.
#[derive(Debug)]
pub enum LoadError {
    Service(NoteServiceError),
    Reconcile(ReconcileError),
    /// The worker task panicked or was cancelled by the runtime.
    Worker(JoinError),
    /// A previous holder of the store or list lock panicked.
    Poisoned,
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::Reconcile(err) => write!(f, "{err}"),
            Self::Worker(err) => write!(f, "load worker failed: {err}"),
            Self::Poisoned => write!(f, "note state lock poisoned"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            Self::Reconcile(err) => Some(err),
            Self::Worker(err) => Some(err),
            Self::Poisoned => None,
        }
    }
}

impl From<NoteServiceError> for LoadError {
    fn from(value: NoteServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<ReconcileError> for LoadError {
    fn from(value: ReconcileError) -> Self {
        Self::Reconcile(value)
    }
}

/// Loads all notes on a blocking worker and waits for the mapped list.
pub async fn load_notes<R>(service: Arc<Mutex<NoteService<R>>>) -> Result<Vec<Note>, LoadError>
where
    R: NoteRepository + Send + 'static,
{
    tokio::task::spawn_blocking(move || -> Result<Vec<Note>, LoadError> {
        let service = service.lock().map_err(|_| LoadError::Poisoned)?;
        Ok(service.load_all()?)
    })
    .await
    .map_err(LoadError::Worker)?
}

/// Loads all notes and installs them into `target` if it is still alive.
///
/// The query and the install run under the store lock, so a write confirmed
/// by another caller lands either before the snapshot or after the install.
pub async fn load_into<R>(
    service: Arc<Mutex<NoteService<R>>>,
    target: Weak<Mutex<NoteListReconciler>>,
    indicator: &dyn LoadingIndicator,
) -> Result<LoadOutcome, LoadError>
where
    R: NoteRepository + Send + 'static,
{
    let _guard = LoadingGuard::show(indicator);
    tokio::task::spawn_blocking(move || install_snapshot(&service, &target))
        .await
        .map_err(LoadError::Worker)?
}

fn install_snapshot<R: NoteRepository>(
    service: &Mutex<NoteService<R>>,
    target: &Weak<Mutex<NoteListReconciler>>,
) -> Result<LoadOutcome, LoadError> {
    let service = service.lock().map_err(|_| LoadError::Poisoned)?;
    let notes = service.load_all()?;

    let Some(list) = target.upgrade() else {
        info!(
            "event=note_load module=loader status=discarded count={}",
            notes.len()
        );
        return Ok(LoadOutcome::Discarded);
    };

    let count = notes.len();
    let mut list = list.lock().map_err(|_| {
        warn!("event=note_load module=loader status=error error_code=list_lock_poisoned");
        LoadError::Poisoned
    })?;
    list.replace_all(notes)?;
    info!("event=note_load module=loader status=ok count={count}");
    Ok(LoadOutcome::Applied { count })
}
