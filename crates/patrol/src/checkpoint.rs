//! Checkpoint directory.
//!
//! A checkpoint is a fixed patrol post identified by an uppercase code. The
//! directory is read-only for the lifetime of the process.

use serde::{Deserialize, Serialize};

/// A known patrol checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatrolPoint {
    /// Unique uppercase identifier, the content of the checkpoint's QR code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Building or zone the checkpoint belongs to.
    pub area: String,
    /// Tasks the guard should perform at this checkpoint, in order.
    #[serde(default)]
    pub checklist: Vec<String>,
}

impl PatrolPoint {
    /// Create a new checkpoint.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        area: impl Into<String>,
        checklist: &[&str],
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            area: area.into(),
            checklist: checklist.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Normalize a scanned or typed payload into checkpoint-code form.
///
/// Trims surrounding whitespace and upper-cases the rest.
#[must_use]
pub fn normalize_code(payload: &str) -> String {
    payload.trim().to_uppercase()
}

/// Look up the checkpoint whose code matches `payload` after normalization.
///
/// Codes are unique, so at most one checkpoint can match.
#[must_use]
pub fn find_point<'a>(points: &'a [PatrolPoint], payload: &str) -> Option<&'a PatrolPoint> {
    let code = normalize_code(payload);
    if code.is_empty() {
        return None;
    }
    points.iter().find(|point| point.code == code)
}

/// The built-in checkpoint directory.
#[must_use]
pub fn builtin_points() -> Vec<PatrolPoint> {
    vec![
        PatrolPoint::new(
            "BLDG-A-LOBBY",
            "Tower A Lobby",
            "Tower A",
            &[
                "Check main entrance doors are secured",
                "Confirm reception CCTV monitor is live",
                "Inspect visitor log for unsigned entries",
            ],
        ),
        PatrolPoint::new(
            "BLDG-A-PODIUM",
            "Tower A Podium Deck",
            "Tower A",
            &[
                "Walk the podium perimeter",
                "Check emergency exit signage is lit",
                "Report obstructions on fire escape routes",
            ],
        ),
        PatrolPoint::new(
            "BLDG-B-ROOF",
            "Tower B Rooftop",
            "Tower B",
            &[
                "Verify roof access door is locked",
                "Inspect plant room for leaks or alarms",
                "Check parapet lighting",
            ],
        ),
        PatrolPoint::new(
            "BLDG-B-LEVEL7",
            "Tower B Level 7 Corridor",
            "Tower B",
            &[
                "Test corridor fire door closers",
                "Confirm server room door is badge-locked",
                "Check extinguisher inspection tags",
            ],
        ),
    ]
}
