//! Result-set to `Note` mapping.
//!
//! Columns are looked up by name, so a result set with extra or reordered
//! columns still maps; a missing, NULL or wrong-typed column fails the whole
//! mapping instead of dropping the row.

use crate::clock::is_note_date;
use crate::db::contract::{COLUMN_DATE, COLUMN_DESCRIPTION, COLUMN_ID, COLUMN_TITLE};
use crate::model::note::{Note, NoteId};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{Row, Rows};

/// Drains `rows` into notes, preserving result-set order.
pub fn map_rows(rows: &mut Rows<'_>) -> RepoResult<Vec<Note>> {
    let mut notes = Vec::new();
    while let Some(row) = rows.next()? {
        notes.push(map_row(row)?);
    }
    Ok(notes)
}

/// Maps a single row; every column is required.
pub fn map_row(row: &Row<'_>) -> RepoResult<Note> {
    let id: NoteId = row.get(COLUMN_ID)?;
    if id <= 0 {
        return Err(RepoError::SchemaMismatch(format!(
            "non-positive value `{id}` in {COLUMN_ID}"
        )));
    }

    let date: String = row.get(COLUMN_DATE)?;
    if !is_note_date(&date) {
        return Err(RepoError::SchemaMismatch(format!(
            "malformed value `{date}` in {COLUMN_DATE}"
        )));
    }

    Ok(Note {
        id: Some(id),
        title: row.get(COLUMN_TITLE)?,
        description: row.get(COLUMN_DESCRIPTION)?,
        date: Some(date),
    })
}
