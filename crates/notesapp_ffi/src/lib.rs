//! Flutter bridge surface for the notes core.

pub mod api;
