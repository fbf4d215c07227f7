//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::query::{SortKey, ViewQuery};
use crate::student::StudentDraft;

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Free text matched against name, roll, notes, phone, and guardian
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Only show this class
    #[arg(short, long, default_value = "")]
    pub class: String,

    /// Sort order
    #[arg(long, value_enum, default_value = "roll")]
    pub sort: SortArg,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl ListCommand {
    /// The view query these arguments describe.
    #[must_use]
    pub fn query(&self) -> ViewQuery {
        ViewQuery::sorted_by(self.sort.into())
            .search(self.search.clone())
            .class(self.class.clone())
    }
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Student's full name
    #[arg(short, long)]
    pub name: String,

    /// Roll number, unique within the class
    #[arg(short, long)]
    pub roll: String,

    /// Class label
    #[arg(short, long)]
    pub class: String,

    /// Guardian's name
    #[arg(short, long, default_value = "")]
    pub guardian: String,

    /// Contact phone number
    #[arg(short, long, default_value = "")]
    pub phone: String,

    /// Free-form notes
    #[arg(long, default_value = "")]
    pub notes: String,
}

impl AddCommand {
    /// The draft these arguments describe.
    #[must_use]
    pub fn draft(&self) -> StudentDraft {
        StudentDraft {
            name: self.name.clone(),
            roll: self.roll.clone(),
            student_class: self.class.clone(),
            guardian: self.guardian.clone(),
            phone: self.phone.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Edit command arguments.
///
/// Fields left out keep their current value.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Identifier of the student to edit (see `list`)
    pub id: String,

    /// New full name
    #[arg(short, long)]
    pub name: Option<String>,

    /// New roll number
    #[arg(short, long)]
    pub roll: Option<String>,

    /// New class label
    #[arg(short, long)]
    pub class: Option<String>,

    /// New guardian's name
    #[arg(short, long)]
    pub guardian: Option<String>,

    /// New phone number
    #[arg(short, long)]
    pub phone: Option<String>,

    /// New notes
    #[arg(long)]
    pub notes: Option<String>,
}

impl EditCommand {
    /// Overlay the given fields on an existing draft.
    #[must_use]
    pub fn apply(&self, mut draft: StudentDraft) -> StudentDraft {
        let fields = [
            (&self.name, &mut draft.name),
            (&self.roll, &mut draft.roll),
            (&self.class, &mut draft.student_class),
            (&self.guardian, &mut draft.guardian),
            (&self.phone, &mut draft.phone),
            (&self.notes, &mut draft.notes),
        ];
        for (update, field) in fields {
            if let Some(value) = update {
                field.clone_from(value);
            }
        }
        draft
    }
}

/// Remove command arguments.
#[derive(Debug, Args)]
pub struct RemoveCommand {
    /// Roll number of the student to remove
    #[arg(short, long)]
    pub roll: String,

    /// Class of the student to remove
    #[arg(short, long)]
    pub class: String,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Where to write the CSV report (`-` for stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Backup command arguments.
#[derive(Debug, Args)]
pub struct BackupCommand {
    /// Where to write the backup (defaults to a dated file name)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Restore command arguments.
#[derive(Debug, Args)]
pub struct RestoreCommand {
    /// Backup file previously written by `backup`
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Clear command arguments.
#[derive(Debug, Args)]
pub struct ClearCommand {
    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Sort order argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// Class, then roll number
    Roll,
    /// Name
    Name,
    /// Notes
    Notes,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Roll => Self::Roll,
            SortArg::Name => Self::Name,
            SortArg::Notes => Self::Notes,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Plain,
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}
