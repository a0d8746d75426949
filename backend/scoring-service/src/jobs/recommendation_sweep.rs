// ============================================
// Recommendation Sweep (職位推薦批量任務)
// ============================================
//
// Two modes over the same per-seeker pipeline:
// - Daily: seekers active within the window (default 30 days), short pacing
// - Comprehensive: every seeker, longer pacing

use super::{is_cancelled, pace, SweepSummary};
use crate::config::SweepConfig;
use crate::error::Result;
use crate::metrics;
use crate::models::SubjectRole;
use crate::services::matching::RecommendationService;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepMode {
    Daily,
    Comprehensive,
}

impl SweepMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SweepMode::Daily => "daily",
            SweepMode::Comprehensive => "comprehensive",
        }
    }
}

impl FromStr for SweepMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(SweepMode::Daily),
            "comprehensive" | "weekly" => Ok(SweepMode::Comprehensive),
            other => Err(format!("unknown sweep mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationSweepReport {
    pub mode: SweepMode,
    pub summary: SweepSummary,
    pub recommendations_generated: usize,
    /// Seekers for whom no candidate job passed the filter
    pub seekers_without_matches: usize,
}

pub struct RecommendationSweepJob {
    service: Arc<RecommendationService>,
    config: SweepConfig,
}

impl RecommendationSweepJob {
    pub fn new(service: Arc<RecommendationService>, config: SweepConfig) -> Self {
        Self { service, config }
    }

    pub async fn recommend_all(
        &self,
        mode: SweepMode,
        now: DateTime<Utc>,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<RecommendationSweepReport> {
        let start_time = Instant::now();
        let db = self.service.aggregator().database();

        let (seekers, pacing_ms) = match mode {
            SweepMode::Daily => {
                let since = now - ChronoDuration::days(self.config.active_window_days);
                (db.list_active_seekers(since).await?, self.config.pacing_ms)
            }
            SweepMode::Comprehensive => (
                db.list_subjects(SubjectRole::Seeker).await?,
                self.config.comprehensive_pacing_ms,
            ),
        };

        info!(
            mode = mode.as_str(),
            seekers = seekers.len(),
            pacing_ms,
            "Starting recommendation sweep"
        );

        let mut summary = SweepSummary::start(seekers.len(), now);
        let mut recommendations_generated = 0;
        let mut seekers_without_matches = 0;
        let pacing = Duration::from_millis(pacing_ms);

        for (idx, seeker_id) in seekers.iter().copied().enumerate() {
            if is_cancelled(&cancel) {
                summary.cancelled = true;
                info!(processed = idx, "Recommendation sweep cancelled");
                break;
            }

            match self.service.recommend_jobs(seeker_id, now).await {
                Ok(outcome) => {
                    summary.succeeded += 1;
                    if outcome.recommendations.is_empty() {
                        seekers_without_matches += 1;
                    }
                    recommendations_generated += outcome.recommendations.len();
                    metrics::record_sweep_subject("recommendation", true);
                }
                Err(e) => {
                    error!(seeker_id = %seeker_id, error = %e, "Failed to generate recommendations");
                    summary.record_failure(seeker_id, &e);
                    metrics::record_sweep_subject("recommendation", false);
                }
            }

            if idx + 1 < seekers.len() {
                pace(pacing, &mut cancel).await;
            }
        }

        summary.finish(start_time.elapsed());

        info!(
            mode = mode.as_str(),
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            recommendations = recommendations_generated,
            without_matches = seekers_without_matches,
            duration_ms = summary.duration_ms,
            "Recommendation sweep completed"
        );

        Ok(RecommendationSweepReport {
            mode,
            summary,
            recommendations_generated,
            seekers_without_matches,
        })
    }
}
