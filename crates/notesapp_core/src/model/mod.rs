//! Domain model for persisted notes.
//!
//! # Invariants
//! - Notes are identified by a store-assigned integer id.
//! - Deletion is a hard delete; no tombstones are kept.

pub mod note;
