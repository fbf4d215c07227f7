//! Whole-store JSON backup and restore.
//!
//! A backup is one JSON object mapping every store key to its value. Values
//! that parse as JSON are embedded as JSON; anything else is embedded as a
//! plain string. Restoring writes each value back in the same text form,
//! so backing up and restoring a store reproduces it.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::access::AccessContext;
use crate::error::{Error, Result};
use crate::storage::Storage;

/// Prefix of generated backup file names.
const BACKUP_FILE_PREFIX: &str = "Student_Register_Backup";

/// Snapshot every key in the store as one JSON object.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn export_backup(store: &Storage) -> Result<Map<String, Value>> {
    let mut backup = Map::new();
    for (key, raw) in store.entries()? {
        let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
        backup.insert(key, value);
    }
    info!(keys = backup.len(), "Exported backup");
    Ok(backup)
}

/// Pretty-print a backup with two-space indentation.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_backup(backup: &Map<String, Value>) -> Result<String> {
    Ok(serde_json::to_string_pretty(backup)?)
}

/// File name for a backup taken on `date`.
#[must_use]
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("{BACKUP_FILE_PREFIX}_{}.json", date.format("%Y-%m-%d"))
}

/// Parse backup file contents into the store entries it describes.
///
/// Objects, arrays, and null are written back as compact JSON; strings are
/// written as-is; numbers and booleans as their literal text.
///
/// # Errors
///
/// Returns [`Error::InvalidBackup`] if the contents are not a JSON object.
pub fn decode_backup(contents: &str) -> Result<Vec<(String, String)>> {
    let parsed: Value =
        serde_json::from_str(contents).map_err(|e| Error::invalid_backup(e.to_string()))?;
    let Value::Object(map) = parsed else {
        return Err(Error::invalid_backup("expected a JSON object at the top level"));
    };

    map.into_iter()
        .map(|(key, value)| -> Result<(String, String)> {
            let text = match value {
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other @ (Value::Null | Value::Array(_) | Value::Object(_)) => {
                    serde_json::to_string(&other)?
                }
            };
            Ok((key, text))
        })
        .collect()
}

/// Replace the entire store with the contents of a backup file.
///
/// Nothing is cleared unless the file parses; the clear and rewrite then
/// happen in a single transaction. Returns the number of keys written.
///
/// # Errors
///
/// - [`Error::PermissionDenied`] if `ctx` may not edit
/// - [`Error::InvalidBackup`] if the contents are not a JSON object
pub fn import_backup(ctx: &AccessContext, store: &Storage, contents: &str) -> Result<usize> {
    ctx.require_edit("restore backup")?;

    let entries = match decode_backup(contents) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Rejected backup file, store left unchanged");
            return Err(e);
        }
    };

    store.replace_all(&entries)?;
    info!(keys = entries.len(), "Restored backup");
    Ok(entries.len())
}

/// Delete every key in the store.
///
/// # Errors
///
/// Returns [`Error::PermissionDenied`] if `ctx` may not edit, or an error if
/// the store cannot be written.
pub fn clear_all(ctx: &AccessContext, store: &Storage) -> Result<usize> {
    ctx.require_edit("clear all data")?;
    store.clear()
}
