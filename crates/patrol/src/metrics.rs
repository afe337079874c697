//! Coverage summary derived from the patrol log.

use std::collections::HashSet;

use serde::Serialize;

use crate::patrol_log::{PatrolLog, PatrolStatus};

/// The five summary metrics shown next to the timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PatrolMetrics {
    /// Number of log entries.
    pub total: usize,
    /// Entries recorded as clear.
    pub clear: usize,
    /// Entries flagged for follow-up.
    pub follow_up: usize,
    /// Entries reporting an incident.
    pub incident: usize,
    /// Percentage of known checkpoints with at least one entry, 0..=100.
    pub coverage_percent: u8,
}

impl PatrolMetrics {
    /// Compute the metrics for `logs` against a directory of
    /// `known_points` checkpoints.
    #[must_use]
    pub fn compute(logs: &[PatrolLog], known_points: usize) -> Self {
        let mut metrics = Self {
            total: logs.len(),
            ..Self::default()
        };

        for log in logs {
            match log.status {
                PatrolStatus::Clear => metrics.clear += 1,
                PatrolStatus::FollowUp => metrics.follow_up += 1,
                PatrolStatus::Incident => metrics.incident += 1,
            }
        }

        let visited: HashSet<&str> = logs.iter().map(|log| log.point_code.as_str()).collect();
        metrics.coverage_percent = coverage_percent(visited.len(), known_points);
        metrics
    }

    /// Count of entries with the given status.
    #[must_use]
    pub fn count(&self, status: PatrolStatus) -> usize {
        match status {
            PatrolStatus::Clear => self.clear,
            PatrolStatus::FollowUp => self.follow_up,
            PatrolStatus::Incident => self.incident,
        }
    }
}

/// `round(100 * visited / known)`, clamped to 100.
///
/// Codes logged against an older directory still count as visited, which is
/// why the clamp is needed.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn coverage_percent(visited: usize, known: usize) -> u8 {
    if known == 0 || visited == 0 {
        return 0;
    }
    let percent = (100.0 * visited as f64 / known as f64).round();
    percent.min(100.0) as u8
}
