// ============================================
// Batch Sweeps (批量任務)
// ============================================
//
// Explicitly invoked, run-once sweeps over seekers:
// 1. Score sweep: recompute and persist every seeker's credit score
// 2. Recommendation sweep: rank jobs for active (daily) or all
//    (comprehensive) seekers
//
// Cadence belongs to the external scheduler (CronJob, systemd timer).
// Sweeps are sequential with a pacing delay and stop at the next subject
// boundary once the cancellation signal flips to `true`.

pub mod recommendation_sweep;
pub mod score_sweep;

pub use recommendation_sweep::{RecommendationSweepJob, RecommendationSweepReport, SweepMode};
pub use score_sweep::{ScoreDelta, ScoreSweepJob, ScoreSweepReport};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct SubjectFailure {
    pub user_id: Uuid,
    pub error: String,
    /// Subject missing or not a seeker, as opposed to a failing collaborator
    pub invalid_subject: bool,
}

/// Tallies shared by every sweep
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepSummary {
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<SubjectFailure>,
    /// Stopped early by the cancellation signal
    pub cancelled: bool,
    pub duration_ms: u64,
}

impl SweepSummary {
    /// `now` is the sweep's reference time, shared with every subject it touches
    pub(crate) fn start(total: usize, now: DateTime<Utc>) -> Self {
        Self {
            started_at: Some(now),
            total,
            ..Default::default()
        }
    }

    pub(crate) fn record_failure(&mut self, user_id: Uuid, err: &crate::error::AppError) {
        self.failed += 1;
        self.failures.push(SubjectFailure {
            user_id,
            error: err.to_string(),
            invalid_subject: err.is_invalid_subject(),
        });
    }

    pub(crate) fn finish(&mut self, elapsed: Duration) {
        let elapsed_chrono =
            chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero());
        self.completed_at = self.started_at.map(|started| started + elapsed_chrono);
        self.duration_ms = elapsed.as_millis() as u64;
    }
}

pub(crate) fn is_cancelled(cancel: &watch::Receiver<bool>) -> bool {
    *cancel.borrow()
}

/// Sleep between subjects, waking early on cancellation
pub(crate) async fn pace(delay: Duration, cancel: &mut watch::Receiver<bool>) {
    if delay.is_zero() {
        return;
    }
    tokio::select! {
        _ = sleep(delay) => {}
        changed = cancel.changed() => {
            // Sender gone: nobody can cancel any more, keep the full delay
            if changed.is_err() {
                sleep(delay).await;
            }
        }
    }
}
