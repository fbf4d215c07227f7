//! Schema versioning for the register store.
//!
//! The version lives under `schema_version` in the `metadata` table. Each
//! step in [`MIGRATIONS`] moves the schema up by one version and is applied
//! in its own transaction together with the version bump.

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::schema::{CREATE_ENTRIES_TABLE, CREATE_METADATA_TABLE};

/// Ordered schema steps; step `n` (1-based) produces version `n`.
const MIGRATIONS: &[&str] = &[CREATE_ENTRIES_TABLE];

/// The schema version this build writes.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const CURRENT_VERSION: i32 = MIGRATIONS.len() as i32;

const VERSION_KEY: &str = "schema_version";

/// Bring the schema at `conn` up to [`CURRENT_VERSION`].
///
/// A fresh database is created from scratch; an existing one only gets the
/// steps it is missing.
///
/// # Errors
///
/// Returns [`Error::DatabaseMigration`] if the database was written by a
/// newer version or records an unreadable version, or a query error if a
/// step fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_METADATA_TABLE)?;

    let found = schema_version(conn)?;
    if found > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {found} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    for (version, sql) in (1..).zip(MIGRATIONS).skip_while(|(v, _)| *v <= found) {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            (VERSION_KEY, version.to_string()),
        )?;
        tx.commit()?;
        debug!(version, "Applied schema step");
    }

    if found < CURRENT_VERSION {
        info!(from = found, to = CURRENT_VERSION, "Schema migrated");
    }
    Ok(())
}

/// Version recorded in `metadata`, or 0 for a database that has none.
fn schema_version(conn: &Connection) -> Result<i32> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match raw {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
    }
}
