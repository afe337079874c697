//! The patrol console: form state, checkpoint matching and the log.
//!
//! [`PatrolConsole`] owns everything the operator sees: the scanner toggle,
//! the entry form, the log collection, and the views derived from them. The
//! log is persisted through a [`LogRepository`] after every change.

use tracing::{debug, warn};

use crate::checkpoint::{find_point, PatrolPoint};
use crate::error::Result;
use crate::metrics::PatrolMetrics;
use crate::patrol_log::{PatrolLog, PatrolStatus};
use crate::scanner::ScannerEvent;
use crate::storage::LogRepository;

/// Message shown in place of the scanner when no camera could be acquired.
pub const CAMERA_FALLBACK_MESSAGE: &str =
    "Camera unavailable. Enter the checkpoint code manually.";

/// The entry form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatrolForm {
    /// Guard name as typed.
    pub guard_name: String,
    /// Scanned or typed checkpoint payload.
    pub scan_payload: String,
    /// Selected status.
    pub status: PatrolStatus,
    /// Free-text notes as typed.
    pub notes: String,
}

/// What the scanner panel shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannerView {
    /// Whether the scanner is shown (and a session should be running).
    pub active: bool,
    /// Latest per-frame decode message; informational only.
    pub frame_error: Option<String>,
    /// Set when the camera could not be acquired; stays until the next
    /// toggle.
    pub camera_error: Option<String>,
}

impl ScannerView {
    /// The manual-entry fallback message, if the camera is unavailable.
    #[must_use]
    pub fn fallback_message(&self) -> Option<&'static str> {
        self.camera_error.as_ref().map(|_| CAMERA_FALLBACK_MESSAGE)
    }
}

/// Application state for one operator session.
#[derive(Debug)]
pub struct PatrolConsole<R> {
    points: Vec<PatrolPoint>,
    logs: Vec<PatrolLog>,
    form: PatrolForm,
    scanner: ScannerView,
    repository: R,
}

impl<R: LogRepository> PatrolConsole<R> {
    /// Open a console over `points`, loading the persisted log.
    ///
    /// A missing, unreadable, or malformed stored log is logged and replaced
    /// by an empty one; it never prevents startup.
    pub fn open(repository: R, points: Vec<PatrolPoint>) -> Self {
        let logs = match repository.load() {
            Ok(logs) => logs,
            Err(e) => {
                warn!(error = %e, "Could not read stored patrol logs, starting empty");
                Vec::new()
            }
        };
        debug!(
            logs = logs.len(),
            points = points.len(),
            "Patrol console opened"
        );

        Self {
            points,
            logs,
            form: PatrolForm::default(),
            scanner: ScannerView::default(),
            repository,
        }
    }

    // === Form ===

    /// Current form fields.
    #[must_use]
    pub fn form(&self) -> &PatrolForm {
        &self.form
    }

    /// Set the guard name.
    pub fn set_guard_name(&mut self, name: impl Into<String>) {
        self.form.guard_name = name.into();
    }

    /// Set the notes.
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.form.notes = notes.into();
    }

    /// Select a status.
    pub fn set_status(&mut self, status: PatrolStatus) {
        self.form.status = status;
    }

    /// Manual entry of the checkpoint payload. The text is upper-cased.
    pub fn set_scan_payload(&mut self, payload: &str) {
        self.form.scan_payload = payload.to_uppercase();
    }

    // === Matching and submission ===

    /// The checkpoint matching the current payload, if any.
    #[must_use]
    pub fn matched_point(&self) -> Option<&PatrolPoint> {
        find_point(&self.points, &self.form.scan_payload)
    }

    /// Whether the current form may be submitted.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.form.guard_name.trim().is_empty()
            && !self.form.scan_payload.trim().is_empty()
            && self.matched_point().is_some()
    }

    /// Log the current form as a patrol event.
    ///
    /// Returns `Ok(None)` without touching anything when the form cannot be
    /// submitted. On success the new entry is first in the log, and the
    /// status, notes and payload are reset; the guard name is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the log could not be persisted. The entry stays in
    /// memory either way.
    pub fn submit(&mut self) -> Result<Option<&PatrolLog>> {
        if !self.can_submit() {
            debug!("Submission gate closed, ignoring submit");
            return Ok(None);
        }
        let Some(point) = self.matched_point() else {
            return Ok(None);
        };

        let log = PatrolLog::new(
            point,
            &self.form.guard_name,
            self.form.scan_payload.clone(),
            self.form.status,
            &self.form.notes,
        );
        debug!(
            id = %log.id,
            point = %log.point_code,
            status = %log.status,
            "Patrol event logged"
        );

        self.logs.insert(0, log);
        self.form.status = PatrolStatus::Clear;
        self.form.notes.clear();
        self.form.scan_payload.clear();

        self.repository.save(&self.logs)?;
        Ok(self.logs.first())
    }

    // === Scanner ===

    /// What the scanner panel shows.
    #[must_use]
    pub fn scanner_view(&self) -> &ScannerView {
        &self.scanner
    }

    /// Show or hide the scanner. Returns whether it is now active.
    ///
    /// Activating clears the previous payload and any error.
    pub fn toggle_scanner(&mut self) -> bool {
        if self.scanner.active {
            self.scanner.active = false;
        } else {
            self.scanner = ScannerView {
                active: true,
                ..ScannerView::default()
            };
            self.form.scan_payload.clear();
        }
        debug!(active = self.scanner.active, "Scanner toggled");
        self.scanner.active
    }

    /// Apply an event from the scanning session.
    ///
    /// Events arriving while the scanner is hidden are ignored.
    pub fn handle_scanner_event(&mut self, event: ScannerEvent) {
        if !self.scanner.active {
            debug!(?event, "Scanner hidden, ignoring event");
            return;
        }
        match event {
            ScannerEvent::Decoded(text) => {
                self.form.scan_payload = text;
                self.scanner.frame_error = None;
                self.scanner.active = false;
            }
            ScannerEvent::FrameError(message) => {
                self.scanner.frame_error = Some(message);
            }
            ScannerEvent::CameraUnavailable(message) => {
                self.scanner.camera_error = Some(message);
            }
        }
    }

    // === Views ===

    /// The checkpoint directory.
    #[must_use]
    pub fn directory(&self) -> &[PatrolPoint] {
        &self.points
    }

    /// All log entries, newest first.
    #[must_use]
    pub fn timeline(&self) -> &[PatrolLog] {
        &self.logs
    }

    /// Summary metrics over the log.
    #[must_use]
    pub fn metrics(&self) -> PatrolMetrics {
        PatrolMetrics::compute(&self.logs, self.points.len())
    }

    /// The backing repository.
    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }
}
