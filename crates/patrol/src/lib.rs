//! `patrol` - A checkpoint patrol logging console with QR scanning
//!
//! Guards scan the QR code posted at each checkpoint; the console matches it
//! against the checkpoint directory, records the visit with a status and
//! notes, and keeps coverage metrics over the stored log.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod patrol_log;
pub mod scanner;
pub mod storage;

pub use checkpoint::PatrolPoint;
pub use config::Config;
pub use console::PatrolConsole;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use metrics::PatrolMetrics;
pub use patrol_log::{PatrolLog, PatrolStatus};
pub use scanner::{ScannerEvent, ScannerHandle, ScannerState};
pub use storage::{LogRepository, SlotStore};
