//! `SQLite` schema definitions for the register store.
//!
//! The store is a flat key-value namespace: every value is opaque text
//! (JSON by convention) and no schema is enforced on it.

/// SQL statement to create the entries table holding the key-value store.
pub const CREATE_ENTRIES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS entries (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the metadata table for internal bookkeeping.
///
/// Outside the key-value namespace, so backups never include it.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";
