//! FFI use-case API for the mobile UI.
//!
//! # Responsibility
//! - Expose the four note boundary operations to Dart via FRB.
//! - Map typed core outcomes to flat envelopes with notice text.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Each call opens the store, runs one use-case and closes the store.
//! - `ok == true` means the store confirmed the write; only then may the UI
//!   patch its list.

use log::warn;
use notesapp_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, load_notes, Note,
    NoteService, Notice, SqliteNoteStore, StoreConfig, WriteOutcome,
};
use std::sync::{Arc, Mutex, OnceLock};

static STORE_CONFIG: OnceLock<StoreConfig> = OnceLock::new();

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and an error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One note as rendered by a list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// `yyyy/MM/dd HH:mm:ss`.
    pub date: String,
}

/// Full reload result for the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    pub ok: bool,
    /// Notes in store order; empty on failure.
    pub items: Vec<NoteItem>,
    /// Notice to show, or empty when none is needed.
    pub message: String,
}

/// Result envelope for create/edit/remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    /// Whether the store confirmed the write.
    pub ok: bool,
    /// `true` when the target id did not exist.
    pub not_found: bool,
    /// Created or edited note, when available.
    pub note: Option<NoteItem>,
    /// Notice text for the UI.
    pub message: String,
}

impl NoteActionResponse {
    fn success(notice: Notice, note: Option<NoteItem>) -> Self {
        Self {
            ok: true,
            not_found: false,
            note,
            message: notice.text().to_string(),
        }
    }

    fn not_found(notice: Notice) -> Self {
        Self {
            ok: false,
            not_found: true,
            note: None,
            message: notice.text().to_string(),
        }
    }

    fn failure(notice: Notice) -> Self {
        Self {
            ok: false,
            not_found: false,
            note: None,
            message: notice.text().to_string(),
        }
    }
}

/// Loads every note on a blocking worker.
pub async fn notes_load_all() -> NotesListResponse {
    let store = match store_config().open_store() {
        Ok(store) => store,
        Err(err) => {
            warn!("event=ffi_load module=ffi status=error error={err}");
            return NotesListResponse {
                ok: false,
                items: Vec::new(),
                message: format!("notes_load_all failed: {err}"),
            };
        }
    };

    let service = Arc::new(Mutex::new(NoteService::new(store)));
    let result = load_notes(Arc::clone(&service)).await;
    close_service(service);

    match result.map_err(|err| err.to_string()).and_then(to_note_items) {
        Ok(items) => {
            let message = if items.is_empty() {
                Notice::EmptyList.text().to_string()
            } else {
                String::new()
            };
            NotesListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => {
            warn!("event=ffi_load module=ffi status=error error={err}");
            NotesListResponse {
                ok: false,
                items: Vec::new(),
                message: format!("notes_load_all failed: {err}"),
            }
        }
    }
}

/// Creates a note; the store assigns id and date.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(title: String, description: String) -> NoteActionResponse {
    match with_note_service(|service| service.create(&title, &description).map_err(|e| e.to_string()))
    {
        Ok(note) => NoteActionResponse::success(Notice::Added, to_note_item(note)),
        Err(err) => {
            warn!("event=ffi_create module=ffi status=error error={err}");
            NoteActionResponse::failure(Notice::AddFailed)
        }
    }
}

/// Rewrites title and description of note `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn note_edit(id: i64, title: String, description: String) -> NoteActionResponse {
    let result = with_note_service(|service| {
        service
            .edit(id, &title, &description)
            .map_err(|e| e.to_string())
    });
    match result {
        Ok(WriteOutcome::Applied) => NoteActionResponse::success(Notice::Updated, None),
        Ok(WriteOutcome::NotFound) => NoteActionResponse::not_found(Notice::UpdateFailed),
        Err(err) => {
            warn!("event=ffi_edit module=ffi status=error error={err}");
            NoteActionResponse::failure(Notice::UpdateFailed)
        }
    }
}

/// Deletes note `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn note_remove(id: i64) -> NoteActionResponse {
    match with_note_service(|service| service.remove(id).map_err(|e| e.to_string())) {
        Ok(WriteOutcome::Applied) => NoteActionResponse::success(Notice::Deleted, None),
        Ok(WriteOutcome::NotFound) => NoteActionResponse::not_found(Notice::DeleteFailed),
        Err(err) => {
            warn!("event=ffi_remove module=ffi status=error error={err}");
            NoteActionResponse::failure(Notice::DeleteFailed)
        }
    }
}

fn store_config() -> &'static StoreConfig {
    STORE_CONFIG.get_or_init(StoreConfig::from_env)
}

fn with_note_service<T>(
    f: impl FnOnce(&NoteService<SqliteNoteStore>) -> Result<T, String>,
) -> Result<T, String> {
    let store = store_config()
        .open_store()
        .map_err(|err| format!("note store open failed: {err}"))?;
    let service = NoteService::new(store);
    let result = f(&service);
    let mut store = service.into_repo();
    if let Err(err) = store.close() {
        warn!("event=ffi_close module=ffi status=error error={err}");
    }
    result
}

fn close_service(service: Arc<Mutex<NoteService<SqliteNoteStore>>>) {
    let Ok(service) = Arc::try_unwrap(service) else {
        return;
    };
    let service = match service.into_inner() {
        Ok(service) => service,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Err(err) = service.into_repo().close() {
        warn!("event=ffi_close module=ffi status=error error={err}");
    }
}

fn to_note_items(notes: Vec<Note>) -> Result<Vec<NoteItem>, String> {
    notes
        .into_iter()
        .enumerate()
        .map(|(index, note)| {
            to_note_item(note).ok_or_else(|| format!("loaded note at {index} has no id or date"))
        })
        .collect()
}

fn to_note_item(note: Note) -> Option<NoteItem> {
    Some(NoteItem {
        id: note.id?,
        title: note.title,
        description: note.description,
        date: note.date?,
    })
}
