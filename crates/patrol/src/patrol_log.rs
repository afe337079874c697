//! Patrol log records.
//!
//! A [`PatrolLog`] is the immutable record of one guard's visit to one
//! checkpoint. Checkpoint code and name are copied in at creation time, so a
//! later change to the directory leaves existing records untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::checkpoint::PatrolPoint;

/// Outcome recorded by the guard at a checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatrolStatus {
    /// Nothing to report.
    #[default]
    Clear,
    /// Something needs a later visit or a maintenance ticket.
    #[serde(rename = "Follow-up")]
    FollowUp,
    /// An incident was observed.
    Incident,
}

impl PatrolStatus {
    /// All statuses in display order.
    pub const ALL: [Self; 3] = [Self::Clear, Self::FollowUp, Self::Incident];
}

impl std::fmt::Display for PatrolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clear => write!(f, "Clear"),
            Self::FollowUp => write!(f, "Follow-up"),
            Self::Incident => write!(f, "Incident"),
        }
    }
}

/// A submitted patrol event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatrolLog {
    /// Unique identifier generated at submission.
    pub id: Uuid,

    /// When the entry was submitted.
    pub timestamp: DateTime<Utc>,

    /// Name of the guard, trimmed.
    pub guard_name: String,

    /// Code of the matched checkpoint.
    pub point_code: String,

    /// Name of the matched checkpoint at submission time.
    pub point_name: String,

    /// The raw scanned or typed payload.
    pub qr_data: String,

    /// Recorded status.
    pub status: PatrolStatus,

    /// Optional free-text notes, trimmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PatrolLog {
    /// Create a new entry for `point`, stamped with the current time.
    ///
    /// Guard name and notes are trimmed; notes that are empty after
    /// trimming are dropped.
    #[must_use]
    pub fn new(
        point: &PatrolPoint,
        guard_name: &str,
        qr_data: impl Into<String>,
        status: PatrolStatus,
        notes: &str,
    ) -> Self {
        let notes = notes.trim();
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            guard_name: guard_name.trim().to_string(),
            point_code: point.code.clone(),
            point_name: point.name.clone(),
            qr_data: qr_data.into(),
            status,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        }
    }
}
