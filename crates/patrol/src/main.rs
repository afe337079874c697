//! `patrol` - CLI for the patrol console
//!
//! This binary logs checkpoint visits, either by reading a scanned QR code or
//! from a typed checkpoint code, and reports on the stored patrol log.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info};

use patrol::cli::{
    CheckpointsCommand, Cli, Command, ConfigCommand, LogCommand, OutputFormat, ScanCommand,
    SummaryCommand, TimelineCommand,
};
use patrol::scanner::{LineCamera, ScannerEvent, ScannerHandle};
use patrol::storage::{SlotRepository, SlotStore};
use patrol::{init_logging, Config, PatrolConsole, PatrolLog, PatrolStatus};

/// Buffered scanner events; frame misses are dropped by the console anyway.
const EVENT_BUFFER: usize = 16;

type Console = PatrolConsole<SlotRepository>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Config commands inspect the file themselves and must work when it is invalid
    if let Command::Config(config_cmd) = cli.command {
        return handle_config(cli.config, config_cmd);
    }

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;
    let mut console = open_console(&config)?;

    match cli.command {
        Command::Scan(cmd) => handle_scan(&config, &mut console, cmd).await,
        Command::Log(cmd) => handle_log(&mut console, cmd),
        Command::Timeline(cmd) => handle_timeline(&console, &cmd),
        Command::Summary(cmd) => handle_summary(&console, &cmd),
        Command::Checkpoints(cmd) => handle_checkpoints(&console, &cmd),
        Command::Config(_) => Ok(()),
    }
}

fn open_console(config: &Config) -> anyhow::Result<Console> {
    let path = config.database_path();
    let store = SlotStore::open(&path)
        .with_context(|| format!("failed to open patrol store at {}", path.display()))?;
    Ok(PatrolConsole::open(
        SlotRepository::new(store),
        config.patrol_points(),
    ))
}

fn fill_form(console: &mut Console, guard: String, status: PatrolStatus, notes: Option<String>) {
    console.set_guard_name(guard);
    console.set_status(status);
    console.set_notes(notes.unwrap_or_default());
}

async fn handle_scan(
    config: &Config,
    console: &mut Console,
    cmd: ScanCommand,
) -> anyhow::Result<()> {
    fill_form(console, cmd.guard, cmd.status.into(), cmd.notes);

    let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
    console.toggle_scanner();
    let handle = ScannerHandle::start(
        Box::new(LineCamera::stdin()),
        config.scanner_options(),
        tx,
    );
    eprintln!("Scan the checkpoint code (Ctrl-D to give up)...");

    while console.scanner_view().active {
        let Some(event) = rx.recv().await else {
            break;
        };
        let frame_error = matches!(event, ScannerEvent::FrameError(_));
        console.handle_scanner_event(event);

        let view = console.scanner_view();
        if let Some(message) = view.fallback_message() {
            eprintln!("{message}");
            break;
        }
        if frame_error {
            if let Some(message) = &view.frame_error {
                eprintln!("  {message}");
            }
        }
    }

    let state = handle.state();
    handle.teardown().await;
    debug!(%state, "Scanner session finished");

    if let Some(error) = &console.scanner_view().camera_error {
        bail!("camera unavailable: {error}");
    }
    if console.form().scan_payload.is_empty() {
        bail!("no checkpoint code was scanned");
    }

    let payload = console.form().scan_payload.clone();
    let Some(point) = console.matched_point() else {
        bail!("unknown checkpoint code '{}'", payload.trim());
    };
    println!("Checkpoint: {} ({})", point.name, point.code);

    if cmd.no_submit {
        return Ok(());
    }
    submit(console)
}

fn handle_log(console: &mut Console, cmd: LogCommand) -> anyhow::Result<()> {
    fill_form(console, cmd.guard, cmd.status.into(), cmd.notes);
    console.set_scan_payload(&cmd.code);

    if console.matched_point().is_none() {
        bail!("unknown checkpoint code '{}'", console.form().scan_payload.trim());
    }
    submit(console)
}

fn submit(console: &mut Console) -> anyhow::Result<()> {
    if console.form().guard_name.trim().is_empty() {
        bail!("guard name must not be empty");
    }
    let Some(log) = console.submit().context("failed to save patrol log")? else {
        bail!("nothing to log");
    };
    info!(id = %log.id, point = %log.point_code, "Patrol visit recorded");
    println!("Logged {}", describe(log));

    let metrics = console.metrics();
    println!(
        "Coverage: {}% of {} checkpoints",
        metrics.coverage_percent,
        console.directory().len()
    );
    Ok(())
}

fn describe(log: &PatrolLog) -> String {
    let mut line = format!(
        "{}  {:<9}  {}  {}  {}",
        log.timestamp.format("%Y-%m-%d %H:%M:%S"),
        log.status.to_string(),
        log.point_code,
        log.point_name,
        log.guard_name
    );
    if let Some(notes) = &log.notes {
        line.push_str("  - ");
        line.push_str(notes);
    }
    line
}

/// The newest `limit` entries of `logs`.
fn newest(logs: &[PatrolLog], limit: Option<usize>) -> &[PatrolLog] {
    &logs[..limit.unwrap_or(logs.len()).min(logs.len())]
}

/// Plain timeline lines. The empty-log message depends on the whole log,
/// not on how much of it was asked for.
fn plain_timeline(all: &[PatrolLog], limit: Option<usize>) -> Vec<String> {
    if all.is_empty() {
        return vec!["No patrol visits logged yet.".to_string()];
    }
    newest(all, limit).iter().map(describe).collect()
}

fn handle_timeline(console: &Console, cmd: &TimelineCommand) -> anyhow::Result<()> {
    let logs = newest(console.timeline(), cmd.limit);

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(logs)?),
        OutputFormat::Plain => {
            for line in plain_timeline(console.timeline(), cmd.limit) {
                println!("{line}");
            }
        }
        OutputFormat::Table => {
            println!(
                "{:<19}  {:<9}  {:<16}  {:<24}  {:<16}  NOTES",
                "TIME", "STATUS", "CODE", "CHECKPOINT", "GUARD"
            );
            for log in logs {
                println!(
                    "{:<19}  {:<9}  {:<16}  {:<24}  {:<16}  {}",
                    log.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    log.status.to_string(),
                    log.point_code,
                    log.point_name,
                    log.guard_name,
                    log.notes.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

fn handle_summary(console: &Console, cmd: &SummaryCommand) -> anyhow::Result<()> {
    let metrics = console.metrics();
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    println!("Patrol summary");
    println!("--------------");
    println!("Total checks:  {}", metrics.total);
    for status in PatrolStatus::ALL {
        println!("{:<14} {}", format!("{status}:"), metrics.count(status));
    }
    println!(
        "Coverage:      {}% of {} checkpoints",
        metrics.coverage_percent,
        console.directory().len()
    );
    Ok(())
}

fn handle_checkpoints(console: &Console, cmd: &CheckpointsCommand) -> anyhow::Result<()> {
    let points = console.directory();
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(points)?);
        return Ok(());
    }

    for point in points {
        println!("{}  {} ({})", point.code, point.name, point.area);
        for item in &point.checklist {
            println!("    - {item}");
        }
    }
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path).context("failed to load configuration")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:       {}", config.database_path().display());
                println!();
                println!("[Scanner]");
                println!("  Frames per second:   {}", config.scanner.fps);
                println!("  Camera:              {}", config.scanner.facing);
                println!(
                    "  Report frame misses: {}",
                    config.scanner.report_frame_errors
                );
                println!();
                println!("[Checkpoints]");
                if config.checkpoints.is_empty() {
                    println!("  Built-in directory:  {}", config.patrol_points().len());
                } else {
                    println!("  Configured:          {}", config.checkpoints.len());
                }
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use patrol::checkpoint::builtin_points;

    fn sample_logs(n: usize) -> Vec<PatrolLog> {
        let points = builtin_points();
        (0..n)
            .map(|i| {
                let point = &points[i % points.len()];
                PatrolLog::new(point, "Alice", point.code.clone(), PatrolStatus::Clear, "")
            })
            .collect()
    }

    #[test]
    fn test_newest_respects_limit() {
        let logs = sample_logs(3);
        assert_eq!(newest(&logs, None).len(), 3);
        assert_eq!(newest(&logs, Some(2)), &logs[..2]);
        assert_eq!(newest(&logs, Some(10)).len(), 3);
    }

    #[test]
    fn test_plain_timeline_empty_log() {
        assert_eq!(
            plain_timeline(&[], Some(5)),
            ["No patrol visits logged yet."]
        );
    }

    #[test]
    fn test_plain_timeline_zero_limit_is_not_empty_log() {
        let logs = sample_logs(2);
        assert!(plain_timeline(&logs, Some(0)).is_empty());
    }

    #[test]
    fn test_plain_timeline_lines() {
        let logs = sample_logs(2);
        let lines = plain_timeline(&logs, Some(1));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("BLDG-A-LOBBY"));
        assert!(lines[0].contains("Alice"));
    }
}
