//! Storage layer for the student register.
//!
//! This module provides a `SQLite`-backed flat key-value store. Keys are
//! plain strings in a single namespace; values are opaque text, JSON by
//! convention. No schema is enforced on values and there are no partial
//! updates: callers read a whole value, change it, and write it back.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Well-known keys in the store namespace.
pub mod keys {
    /// JSON array of student records.
    pub const STUDENTS: &str = "students";
    /// JSON object mapping composite attendance keys to booleans.
    pub const ATTENDANCE: &str = "attendance_records";
    /// JSON object mapping composite result keys to score strings.
    pub const RESULTS: &str = "results_data";
    /// UI theme, `"light"` or `"dark"`.
    pub const THEME: &str = "theme";
}

/// Format `SQLite`'s `datetime('now')` produces.
const SQLITE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Persistent key-value store.
///
/// Provides durable storage using `SQLite` with support for:
/// - Whole-value reads and writes by key
/// - Listing and clearing the namespace
/// - Transactional replacement of every key at once (used by restore)
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM entries WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO entries (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')
            ",
            params![key, value],
        )?;
        debug!(key, bytes = value.len(), "Stored value");
        Ok(())
    }

    /// List every key in the store, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM entries ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    /// List every key-value pair in the store, sorted by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM entries ORDER BY key")?;
        let entries = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Count keys in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete every key in the store.
    ///
    /// Returns the number of keys deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear(&self) -> Result<usize> {
        let affected = self.conn.execute("DELETE FROM entries", [])?;
        info!("Cleared {} keys", affected);
        Ok(affected)
    }

    /// Replace the whole store with `entries`.
    ///
    /// The clear and every write happen in one transaction: either the store
    /// ends up holding exactly `entries`, or it is left as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn replace_all(&self, entries: &[(String, String)]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM entries", [])?;
        {
            let mut stmt = tx.prepare("INSERT INTO entries (key, value) VALUES (?1, ?2)")?;
            for (key, value) in entries {
                stmt.execute(params![key, value])?;
            }
        }
        tx.commit()?;

        info!("Replaced store contents with {} keys", entries.len());
        Ok(())
    }

    /// Read and parse the JSON value under `key`.
    ///
    /// An absent key yields `T::default()`. So does a value that does not
    /// parse as `T`; that case is logged and otherwise treated as empty.
    ///
    /// # Errors
    ///
    /// Returns an error only if the database operation fails.
    pub fn get_json_or_default<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let Some(raw) = self.get(key)? else {
            return Ok(T::default());
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(key, error = %e, "Stored value is not readable, treating as empty");
                Ok(T::default())
            }
        }
    }

    /// Get store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_keys = self.count()?;

        let last_updated: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM entries ORDER BY updated_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let last_updated = last_updated
            .and_then(|s| NaiveDateTime::parse_from_str(&s, SQLITE_DATETIME_FORMAT).ok())
            .map(|dt| dt.and_utc());

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_keys,
            last_updated,
            db_size_bytes,
        })
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Total number of keys stored.
    pub total_keys: i64,
    /// When any key was last written.
    pub last_updated: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    #[test]
    fn test_open_in_memory() {
        let storage = Storage::open_in_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_set_and_get() {
        let storage = create_test_storage();
        storage.set("theme", "dark").unwrap();

        assert_eq!(storage.get("theme").unwrap(), Some("dark".to_string()));
    }

    #[test]
    fn test_get_missing() {
        let storage = create_test_storage();
        assert!(storage.get("nothing").unwrap().is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let storage = create_test_storage();
        storage.set("theme", "light").unwrap();
        storage.set("theme", "dark").unwrap();

        assert_eq!(storage.get("theme").unwrap(), Some("dark".to_string()));
        assert_eq!(storage.count().unwrap(), 1);
    }

    #[test]
    fn test_keys_and_entries_sorted() {
        let storage = create_test_storage();
        storage.set("students", "[]").unwrap();
        storage.set("attendance_records", "{}").unwrap();
        storage.set("theme", "light").unwrap();

        assert_eq!(
            storage.keys().unwrap(),
            vec!["attendance_records", "students", "theme"]
        );
        let entries = storage.entries().unwrap();
        assert_eq!(entries[1], ("students".to_string(), "[]".to_string()));
    }

    #[test]
    fn test_clear() {
        let storage = create_test_storage();
        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();

        assert_eq!(storage.clear().unwrap(), 2);
        assert_eq!(storage.count().unwrap(), 0);
    }

    #[test]
    fn test_replace_all() {
        let storage = create_test_storage();
        storage.set("old", "gone").unwrap();

        storage
            .replace_all(&[
                ("students".to_string(), "[]".to_string()),
                ("theme".to_string(), "dark".to_string()),
            ])
            .unwrap();

        assert!(storage.get("old").unwrap().is_none());
        assert_eq!(storage.keys().unwrap(), vec!["students", "theme"]);
    }

    #[test]
    fn test_replace_all_rolls_back_on_failure() {
        let storage = create_test_storage();
        storage.set("kept", "yes").unwrap();

        // A repeated key violates the primary key inside the transaction.
        let result = storage.replace_all(&[
            ("dup".to_string(), "1".to_string()),
            ("dup".to_string(), "2".to_string()),
        ]);

        assert!(result.is_err());
        assert_eq!(storage.get("kept").unwrap(), Some("yes".to_string()));
        assert!(storage.get("dup").unwrap().is_none());
    }

    #[test]
    fn test_get_json_or_default_missing() {
        let storage = create_test_storage();
        let value: Vec<i32> = storage.get_json_or_default("nums").unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn test_get_json_or_default_unparsable() {
        let storage = create_test_storage();
        storage.set("nums", "{not json").unwrap();

        let value: Vec<i32> = storage.get_json_or_default("nums").unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn test_get_json_or_default_parses() {
        let storage = create_test_storage();
        storage.set("nums", "[1,2,3]").unwrap();

        let value: Vec<i32> = storage.get_json_or_default("nums").unwrap();
        assert_eq!(value, vec![1, 2, 3]);
    }

    #[test]
    fn test_stats_empty() {
        let storage = create_test_storage();
        let stats = storage.stats().unwrap();

        assert_eq!(stats.total_keys, 0);
        assert!(stats.last_updated.is_none());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_stats_with_data() {
        let storage = create_test_storage();
        storage.set("a", "1").unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_keys, 1);
        assert!(stats.last_updated.is_some());
    }

    #[test]
    fn test_path() {
        let storage = create_test_storage();
        assert_eq!(storage.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_open_file_based_persists() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("register.db");

        {
            let storage = Storage::open(&db_path).unwrap();
            storage.set("students", "[]").unwrap();
            assert_eq!(storage.path(), db_path);
        }

        let reopened = Storage::open(&db_path).unwrap();
        assert_eq!(reopened.get("students").unwrap(), Some("[]".to_string()));
        assert!(reopened.stats().unwrap().db_size_bytes > 0);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested_path = dir.path().join("nested/deeper/register.db");

        let storage = Storage::open(&nested_path).unwrap();
        assert!(nested_path.exists());
        drop(storage);
    }

    #[test]
    fn test_unicode_values() {
        let storage = create_test_storage();
        storage.set("notes", "Élève très sérieux 学生").unwrap();

        assert_eq!(
            storage.get("notes").unwrap(),
            Some("Élève très sérieux 学生".to_string())
        );
    }
}
