//! Static table and column names for persisted notes.
//!
//! Every SQL statement in core refers to these names instead of string
//! literals, so the migration file and queries cannot drift apart silently.

/// Notes table name.
pub const TABLE_NAME: &str = "note";

/// Auto-increment primary key.
pub const COLUMN_ID: &str = "_id";
pub const COLUMN_TITLE: &str = "title";
pub const COLUMN_DESCRIPTION: &str = "description";
/// Creation timestamp formatted as `yyyy/MM/dd HH:mm:ss`.
pub const COLUMN_DATE: &str = "date";

/// All columns in select order.
pub const NOTE_COLUMNS: [&str; 4] = [COLUMN_ID, COLUMN_TITLE, COLUMN_DESCRIPTION, COLUMN_DATE];
