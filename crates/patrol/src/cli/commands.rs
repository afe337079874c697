//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::patrol_log::PatrolStatus;

/// Scan command arguments.
#[derive(Debug, Args)]
pub struct ScanCommand {
    /// Name of the guard on patrol
    #[arg(short, long)]
    pub guard: String,

    /// Status to record for the checkpoint
    #[arg(short, long, value_enum, default_value = "clear")]
    pub status: StatusArg,

    /// Notes to attach to the entry
    #[arg(short, long)]
    pub notes: Option<String>,

    /// Print the scanned checkpoint without logging it
    #[arg(long)]
    pub no_submit: bool,
}

/// Log command arguments.
#[derive(Debug, Args)]
pub struct LogCommand {
    /// Name of the guard on patrol
    #[arg(short, long)]
    pub guard: String,

    /// Checkpoint code, as printed under the QR code
    #[arg(long)]
    pub code: String,

    /// Status to record for the checkpoint
    #[arg(short, long, value_enum, default_value = "clear")]
    pub status: StatusArg,

    /// Notes to attach to the entry
    #[arg(short, long)]
    pub notes: Option<String>,
}

/// Timeline command arguments.
#[derive(Debug, Args)]
pub struct TimelineCommand {
    /// Maximum number of entries, newest first
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Summary command arguments.
#[derive(Debug, Args)]
pub struct SummaryCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Checkpoints command arguments.
#[derive(Debug, Args)]
pub struct CheckpointsCommand {
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

/// Patrol status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusArg {
    /// Nothing to report
    #[default]
    Clear,
    /// Needs another look
    FollowUp,
    /// Something happened
    Incident,
}

impl From<StatusArg> for PatrolStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Clear => Self::Clear,
            StatusArg::FollowUp => Self::FollowUp,
            StatusArg::Incident => Self::Incident,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
