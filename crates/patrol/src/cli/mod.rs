//! Command-line interface for the patrol console.
//!
//! This module provides the CLI structure for the `patrol` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CheckpointsCommand, ConfigCommand, LogCommand, OutputFormat, ScanCommand, StatusArg,
    SummaryCommand, TimelineCommand,
};

/// patrol - Log checkpoint visits by scanning their QR codes
///
/// Guards scan the code posted at each checkpoint, pick a status, and the
/// visit is recorded in a local log with coverage metrics.
#[derive(Debug, Parser)]
#[command(name = "patrol")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
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
    /// Scan a checkpoint code and log the visit
    Scan(ScanCommand),

    /// Log a visit by typing the checkpoint code
    Log(LogCommand),

    /// Show logged visits, newest first
    Timeline(TimelineCommand),

    /// Show patrol totals and checkpoint coverage
    Summary(SummaryCommand),

    /// List the known checkpoints
    Checkpoints(CheckpointsCommand),

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
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn summary_cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Summary(SummaryCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "patrol");
    }

    #[test]
    fn test_verbosity_levels() {
        use crate::logging::Verbosity;

        assert_eq!(summary_cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(summary_cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(summary_cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(summary_cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(summary_cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan() {
        let cli = Cli::try_parse_from(["patrol", "scan", "--guard", "Alice"]).unwrap();
        let Command::Scan(cmd) = cli.command else {
            panic!("expected scan command");
        };
        assert_eq!(cmd.guard, "Alice");
        assert_eq!(cmd.status, StatusArg::Clear);
        assert!(cmd.notes.is_none());
        assert!(!cmd.no_submit);
    }

    #[test]
    fn test_parse_scan_requires_guard() {
        assert!(Cli::try_parse_from(["patrol", "scan"]).is_err());
    }

    #[test]
    fn test_parse_log_with_status() {
        let cli = Cli::try_parse_from([
            "patrol",
            "log",
            "-g",
            "Bob",
            "--code",
            "bldg-b-roof",
            "--status",
            "follow-up",
            "--notes",
            "door ajar",
        ])
        .unwrap();
        let Command::Log(cmd) = cli.command else {
            panic!("expected log command");
        };
        assert_eq!(cmd.code, "bldg-b-roof");
        assert_eq!(cmd.status, StatusArg::FollowUp);
        assert_eq!(cmd.notes.as_deref(), Some("door ajar"));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_timeline() {
        let cli =
            Cli::try_parse_from(["patrol", "timeline", "--limit", "5", "-f", "json"]).unwrap();
        let Command::Timeline(cmd) = cli.command else {
            panic!("expected timeline command");
        };
        assert_eq!(cmd.limit, Some(5));
        assert_eq!(cmd.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_config_validate() {
        let cli =
            Cli::try_parse_from(["patrol", "config", "validate", "--file", "/tmp/p.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let args = ["patrol", "-c", "/custom/config.toml", "summary"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let cli = Cli::try_parse_from(["patrol", "-vv", "checkpoints"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_with_quiet() {
        let cli = Cli::try_parse_from(["patrol", "-q", "summary"]).unwrap();
        assert!(cli.quiet);
    }
}
