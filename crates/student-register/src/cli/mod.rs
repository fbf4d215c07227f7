//! Command-line interface for the student register.
//!
//! This module provides the CLI structure for the `stureg` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, BackupCommand, ClearCommand, ConfigCommand, EditCommand, ExportCommand,
    ListCommand, OutputFormat, RemoveCommand, RestoreCommand, SortArg, StatsCommand,
    StatusCommand,
};

/// stureg - Keep a register of students
///
/// Maintains a roster of students in a local store, with search, sorting,
/// class totals, a CSV master report, and JSON backup and restore.
#[derive(Debug, Parser)]
#[command(name = "stureg")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// PIN selecting the role to act as (no PIN means guest)
    #[arg(long, global = true, env = "STUREG_PIN", hide_env_values = true)]
    pub pin: Option<String>,

    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List students, filtered and sorted, with class totals
    List(ListCommand),

    /// Add a student (admin)
    Add(AddCommand),

    /// Edit a student (admin)
    Edit(EditCommand),

    /// Remove a student by roll and class (admin)
    Remove(RemoveCommand),

    /// Show total and per-class counts
    Stats(StatsCommand),

    /// Write the CSV master report
    Export(ExportCommand),

    /// Write a JSON backup of the whole store
    Backup(BackupCommand),

    /// Replace the whole store from a JSON backup (admin)
    Restore(RestoreCommand),

    /// Delete all data (admin)
    Clear(ClearCommand),

    /// Show store status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                2 => crate::logging::Verbosity::Debug,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
