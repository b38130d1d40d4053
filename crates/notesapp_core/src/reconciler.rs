//! Position-addressed in-memory mirror of the notes table.
//!
//! # Responsibility
//! - Hold the ordered list a list view renders from.
//! - Apply add/update/remove after the store has confirmed them.
//! - Tell a renderer which positions changed so it can redraw minimally.
//!
//! # Invariants
//! - Every held note carries a store-assigned id.
//! - The mirror is never the first writer; callers mutate the store first.
//! - Lookups are positional only; there is no id index.

use crate::model::note::Note;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Positions affected by one reconciler operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    /// The whole list was replaced; `len` is the new size.
    Reset { len: usize },
    Inserted(usize),
    Changed(usize),
    Removed(usize),
    /// Positions `start..end` moved or changed.
    RangeChanged { start: usize, end: usize },
}

/// Receives change notifications from a [`NoteListReconciler`].
pub trait ListChangeListener: Send {
    fn on_list_change(&mut self, change: ListChange);
}

impl<F> ListChangeListener for F
where
    F: FnMut(ListChange) + Send,
{
    fn on_list_change(&mut self, change: ListChange) {
        self(change)
    }
}

/// Misuse of the reconciler by its caller.
#[derive(Debug)]
pub enum ReconcileError {
    IndexOutOfRange { index: usize, len: usize },
    /// A note without a store-assigned id was offered to the mirror.
    UnsavedDraft,
    Snapshot(serde_json::Error),
}

impl Display for ReconcileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "list index {index} out of range for length {len}")
            }
            Self::UnsavedDraft => write!(f, "note has not been saved to the store"),
            Self::Snapshot(err) => write!(f, "invalid list snapshot: {err}"),
        }
    }
}

impl Error for ReconcileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Snapshot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ReconcileError {
    fn from(value: serde_json::Error) -> Self {
        Self::Snapshot(value)
    }
}

/// Ordered mirror of confirmed notes.
#[derive(Default)]
pub struct NoteListReconciler {
    notes: Vec<Note>,
    listener: Option<Box<dyn ListChangeListener>>,
}

impl NoteListReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(listener: impl ListChangeListener + 'static) -> Self {
        let mut reconciler = Self::new();
        reconciler.set_listener(listener);
        reconciler
    }

    /// Installs the renderer hook, replacing any previous one.
    pub fn set_listener(&mut self, listener: impl ListChangeListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Current number of notes.
    pub fn count(&self) -> usize {
        self.notes.len()
    }

    pub fn get(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    pub fn items(&self) -> &[Note] {
        &self.notes
    }

    /// Discards current contents and installs `notes` after a full reload.
    pub fn replace_all(&mut self, notes: Vec<Note>) -> Result<(), ReconcileError> {
        if notes.iter().any(|note| !note.is_persisted()) {
            return Err(ReconcileError::UnsavedDraft);
        }

        self.notes = notes;
        let len = self.notes.len();
        debug!("event=list_replace module=reconciler status=ok len={len}");
        self.notify(ListChange::Reset { len });
        Ok(())
    }

    /// Appends a note whose insert the store already confirmed.
    pub fn add_item(&mut self, note: Note) -> Result<(), ReconcileError> {
        if !note.is_persisted() {
            return Err(ReconcileError::UnsavedDraft);
        }

        self.notes.push(note);
        let index = self.notes.len() - 1;
        self.notify(ListChange::Inserted(index));
        Ok(())
    }

    /// Replaces the note at `index` after a confirmed update.
    pub fn update_item(&mut self, index: usize, note: Note) -> Result<(), ReconcileError> {
        if !note.is_persisted() {
            return Err(ReconcileError::UnsavedDraft);
        }
        let len = self.notes.len();
        let slot = self
            .notes
            .get_mut(index)
            .ok_or(ReconcileError::IndexOutOfRange { index, len })?;

        *slot = note;
        self.notify(ListChange::Changed(index));
        Ok(())
    }

    /// Removes the note at `index` after a confirmed delete and returns it.
    ///
    /// Emits `Removed(index)` and then `RangeChanged { index, len }`, since
    /// every later position shifted down by one.
    pub fn remove_item(&mut self, index: usize) -> Result<Note, ReconcileError> {
        let len = self.notes.len();
        if index >= len {
            return Err(ReconcileError::IndexOutOfRange { index, len });
        }

        let removed = self.notes.remove(index);
        self.notify(ListChange::Removed(index));
        self.notify(ListChange::RangeChanged {
            start: index,
            end: self.notes.len(),
        });
        Ok(removed)
    }

    /// Serializes the current contents for instance-state saving.
    pub fn to_snapshot(&self) -> Result<String, ReconcileError> {
        Ok(serde_json::to_string(&self.notes)?)
    }

    /// Restores contents saved by [`Self::to_snapshot`], skipping a reload.
    pub fn restore_snapshot(&mut self, snapshot: &str) -> Result<(), ReconcileError> {
        let notes: Vec<Note> = serde_json::from_str(snapshot)?;
        self.replace_all(notes)
    }

    fn notify(&mut self, change: ListChange) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_list_change(change);
        }
    }
}

impl std::fmt::Debug for NoteListReconciler {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteListReconciler")
            .field("notes", &self.notes)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}
