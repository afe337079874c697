//! QR scanner lifecycle.
//!
//! This module defines the camera seam and the adapter that drives one
//! decoding session over it:
//!
//! - [`Camera`] / [`CameraStream`]: host-provided capability. A camera is
//!   opened by constraints (which way it faces), never by device id, and
//!   yields one [`Frame`] per decode attempt.
//! - [`ScannerHandle`]: owns the session task. The session walks
//!   `Idle → Starting → Running → (Decoded | Errored | Stopped)` and reports
//!   to its owner through [`ScannerEvent`]s on a channel.
//! - A [`CancellationToken`](tokio_util::sync::CancellationToken) shared by
//!   the two is checked before every event delivery so nothing reaches an
//!   owner that has torn the scanner down.

mod adapter;
mod line;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use adapter::ScannerHandle;
pub use line::LineCamera;

/// Which way a camera faces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Rear-facing, pointed away from the operator.
    #[default]
    Environment,
    /// Front-facing, pointed at the operator.
    User,
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Environment => write!(f, "rear-facing"),
            Self::User => write!(f, "front-facing"),
        }
    }
}

/// Capability descriptor used to pick a camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraConstraints {
    /// Required facing mode.
    pub facing: Facing,
}

/// Result of one decode attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A code was decoded; carries the raw text.
    Decoded(String),
    /// No code could be decoded from this frame.
    Miss(String),
    /// The stream has no more frames.
    Ended,
}

/// A live camera stream that decodes one frame per call.
#[async_trait::async_trait]
pub trait CameraStream: Send {
    /// Attempt to decode the next frame.
    async fn read_frame(&mut self) -> Frame;

    /// Stop the stream and release the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the device could not be released cleanly.
    async fn stop(&mut self) -> Result<()>;
}

/// A camera capability provided by the host.
#[async_trait::async_trait]
pub trait Camera: Send {
    /// The name of this camera (for logging).
    fn name(&self) -> &'static str;

    /// Acquire a stream matching `constraints`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::CameraUnavailable`] if no matching device
    /// exists, permission is denied, or the device is already in use.
    async fn open(&mut self, constraints: &CameraConstraints) -> Result<Box<dyn CameraStream>>;
}

/// Options for a scanning session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerOptions {
    /// Decode attempts per second.
    pub fps: u32,
    /// Camera to request.
    pub facing: Facing,
    /// Deliver a [`ScannerEvent::FrameError`] for every decode miss.
    pub report_frame_errors: bool,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            fps: 10,
            facing: Facing::Environment,
            report_frame_errors: true,
        }
    }
}

impl ScannerOptions {
    /// Time between decode attempts.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

/// Events delivered from a scanning session to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerEvent {
    /// A code was decoded. The text is exactly what the decoder produced.
    Decoded(String),
    /// A single frame could not be decoded. Frequent and never fatal.
    FrameError(String),
    /// The camera could not be acquired; scanning is unavailable.
    CameraUnavailable(String),
}

/// Lifecycle state of a scanning session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ScannerState {
    /// Not started.
    Idle = 0,
    /// Acquiring the camera.
    Starting = 1,
    /// Camera live, decoding frames.
    Running = 2,
    /// A code was decoded and the camera released.
    Decoded = 3,
    /// The camera could not be acquired.
    Errored = 4,
    /// Stopped without a decode.
    Stopped = 5,
}

impl ScannerState {
    /// Whether the session has finished.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Decoded | Self::Errored | Self::Stopped)
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Starting,
            2 => Self::Running,
            3 => Self::Decoded,
            4 => Self::Errored,
            5 => Self::Stopped,
            _ => Self::Idle,
        }
    }
}

impl std::fmt::Display for ScannerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running"),
            Self::Decoded => write!(f, "decoded"),
            Self::Errored => write!(f, "errored"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Shared cell holding a session's [`ScannerState`].
#[derive(Debug, Clone)]
pub(crate) struct StateCell(Arc<AtomicU8>);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(Arc::new(AtomicU8::new(ScannerState::Idle as u8)))
    }

    pub(crate) fn get(&self) -> ScannerState {
        ScannerState::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub(crate) fn set(&self, state: ScannerState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }
}
