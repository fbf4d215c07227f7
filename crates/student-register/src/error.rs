//! Error types for the student register.
//!
//! This module defines all error types used throughout the crate. Errors from
//! user-initiated mutations are meant to be shown to the user as a single
//! line, so every message is written to stand on its own.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for register operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Roster ===
    /// A required student field was missing or blank.
    #[error("please fill all required fields: {field} is missing")]
    Validation {
        /// Name of the missing field.
        field: &'static str,
    },

    /// Another student already holds this roll number in this class.
    #[error("roll {roll} is already taken in class {class}")]
    DuplicateKey {
        /// Roll number that collided.
        roll: String,
        /// Class the collision happened in.
        class: String,
    },

    /// No student has the given identifier.
    #[error("no student with id {id}")]
    StudentNotFound {
        /// The identifier that was looked up.
        id: String,
    },

    // === Access ===
    /// The current role may not perform this action.
    #[error("permission denied: {action} requires the admin role")]
    PermissionDenied {
        /// The action that was refused.
        action: &'static str,
    },

    /// The supplied PIN matched neither role.
    #[error("incorrect PIN")]
    IncorrectPin,

    // === Backup ===
    /// A restore file could not be used.
    #[error("invalid backup file: {message}")]
    InvalidBackup {
        /// Description of what was wrong with the file.
        message: String,
    },

    // === Store ===
    /// The register database could not be opened.
    #[error("cannot open register store {path}: {source}")]
    DatabaseOpen {
        /// Database file that was being opened.
        path: PathBuf,
        /// Why `SQLite` refused.
        #[source]
        source: rusqlite::Error,
    },

    /// A read or write against the store failed.
    #[error("register store error: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// The store's schema could not be brought up to date.
    #[error("register store schema: {message}")]
    DatabaseMigration {
        /// What was wrong with the recorded schema.
        message: String,
    },

    // === Configuration ===
    /// The configuration sources could not be merged or parsed.
    #[error("cannot load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// The configuration parsed but holds unusable values.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Which setting is wrong and how.
        message: String,
    },

    // === Files and formats ===
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The directory that holds the store could not be created.
    #[error("cannot create directory {path}: {source}")]
    DirectoryCreate {
        /// Directory that was being created.
        path: PathBuf,
        /// Why creation failed.
        #[source]
        source: std::io::Error,
    },

    /// A value could not be encoded as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The CSV report could not be written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A condition the register never expects to reach.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result of a register operation.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// An [`Error::Internal`] with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create an invalid backup error.
    #[must_use]
    pub fn invalid_backup(message: impl Into<String>) -> Self {
        Self::InvalidBackup {
            message: message.into(),
        }
    }

    /// Create a duplicate natural key error.
    #[must_use]
    pub fn duplicate_key(roll: impl Into<String>, class: impl Into<String>) -> Self {
        Self::DuplicateKey {
            roll: roll.into(),
            class: class.into(),
        }
    }

    /// Check if this error was caused by user input rather than the system.
    ///
    /// These are the errors a front end reports as a transient status
    /// message; the rest indicate a broken environment.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::DuplicateKey { .. }
                | Self::StudentNotFound { .. }
                | Self::PermissionDenied { .. }
                | Self::IncorrectPin
                | Self::InvalidBackup { .. }
        )
    }

    /// Check if this error is an access-control refusal.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. } | Self::IncorrectPin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = Error::Validation { field: "name" };
        assert_eq!(
            err.to_string(),
            "please fill all required fields: name is missing"
        );
    }

    #[test]
    fn test_duplicate_key_display() {
        let err = Error::duplicate_key("5", "7");
        assert_eq!(err.to_string(), "roll 5 is already taken in class 7");
    }

    #[test]
    fn test_permission_denied_display() {
        let err = Error::PermissionDenied {
            action: "remove student",
        };
        let msg = err.to_string();
        assert!(msg.contains("remove student"));
        assert!(msg.contains("admin"));
    }

    #[test]
    fn test_invalid_backup_display() {
        let err = Error::invalid_backup("expected a JSON object");
        assert_eq!(
            err.to_string(),
            "invalid backup file: expected a JSON object"
        );
    }

    #[test]
    fn test_is_user_error() {
        assert!(Error::Validation { field: "roll" }.is_user_error());
        assert!(Error::duplicate_key("1", "6").is_user_error());
        assert!(Error::IncorrectPin.is_user_error());
        assert!(Error::invalid_backup("bad").is_user_error());
        assert!(!Error::internal("bug").is_user_error());
    }

    #[test]
    fn test_is_permission_error() {
        assert!(Error::IncorrectPin.is_permission_error());
        assert!(Error::PermissionDenied { action: "x" }.is_permission_error());
        assert!(!Error::Validation { field: "name" }.is_permission_error());
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert_eq!(err.to_string(), "register store schema: version mismatch");
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
