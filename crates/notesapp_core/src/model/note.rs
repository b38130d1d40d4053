//! Note domain model.
//!
//! # Responsibility
//! - Define the record shared by the store, the mapper and the list mirror.
//! - Validate and normalize user-editable fields before persistence.
//!
//! # Invariants
//! - `id` is `None` only for drafts; the store assigns it on insert.
//! - `date` is assigned once on insert and never rewritten.
//! - Persisted titles are non-empty after trimming.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned row identifier (`_id`).
pub type NoteId = i64;

/// One note as known to the list view and the store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Note {
    /// `None` while the note is a draft.
    pub id: Option<NoteId>,
    pub title: String,
    pub description: String,
    /// `yyyy/MM/dd HH:mm:ss`; `None` while the note is a draft.
    pub date: Option<String>,
}

impl Note {
    /// Creates an unsaved draft with empty fields.
    pub fn draft() -> Self {
        Self::default()
    }

    /// Builds a persisted note from a freshly inserted row.
    pub fn persisted(id: NoteId, fields: NoteFields, date: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            title: fields.title,
            description: fields.description,
            date: Some(date.into()),
        }
    }

    /// Returns whether the store has assigned an id to this note.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Returns a copy carrying edited fields; `id` and `date` are kept.
    pub fn with_fields(&self, fields: NoteFields) -> Self {
        Self {
            id: self.id,
            title: fields.title,
            description: fields.description,
            date: self.date.clone(),
        }
    }
}

/// Validated user-editable fields of a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFields {
    title: String,
    description: String,
}

impl NoteFields {
    /// Trims both inputs and rejects an empty title.
    ///
    /// # Errors
    /// - [`NoteValidationError::EmptyTitle`] when the trimmed title is empty.
    pub fn new(
        title: impl AsRef<str>,
        description: impl AsRef<str>,
    ) -> Result<Self, NoteValidationError> {
        let title = title.as_ref().trim();
        if title.is_empty() {
            return Err(NoteValidationError::EmptyTitle);
        }

        Ok(Self {
            title: title.to_string(),
            description: description.as_ref().trim().to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Validation failure for user-editable note fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title is empty or whitespace-only.
    EmptyTitle,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title can't be blank"),
        }
    }
}

impl Error for NoteValidationError {}
