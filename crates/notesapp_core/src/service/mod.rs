//! Note use-cases for the presentation layer.
//!
//! # Responsibility
//! - Expose create/edit/remove/load as typed request/response calls.
//! - Keep list views consistent with the store through `NoteListSession`.
//! - Keep UI/FFI layers decoupled from SQL details.

pub mod list_session;
pub mod loader;
pub mod note_service;
