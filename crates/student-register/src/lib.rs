//! `student-register` - A student record register over a local key-value store
//!
//! This library keeps a roster of students in a flat, durable key-value
//! store and provides search, sorting, dashboard totals, a CSV master
//! report, and whole-store JSON backup and restore. Mutations take an
//! explicit [`AccessContext`]; only admins may change data.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod access;
pub mod cli;
pub mod config;
pub mod error;
pub mod exchange;
pub mod logging;
pub mod query;
pub mod roster;
pub mod stats;
pub mod storage;
pub mod student;

pub use access::{AccessContext, Role};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use query::{view, SortKey, ViewQuery};
pub use roster::{EditTarget, RosterRepository};
pub use stats::{compute_stats, ClassCount, RosterStats};
pub use storage::{Storage, StorageStats};
pub use student::{Student, StudentDraft, StudentId};
