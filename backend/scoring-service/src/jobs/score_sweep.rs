// ============================================
// Score Sweep (信用分批量更新)
// ============================================
//
// update_all: recompute, persist and (maybe) notify for every seeker.
// Per-subject failures are tallied, never fatal; only a failing seeker
// listing aborts the sweep.

use super::{is_cancelled, pace, SweepSummary};
use crate::config::SweepConfig;
use crate::error::Result;
use crate::metrics;
use crate::models::SubjectRole;
use crate::services::credit::CreditScoreService;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{error, info};
use uuid::Uuid;

/// Scores below this count as low in the sweep report
pub const LOW_SCORE_THRESHOLD: i32 = 40;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreDelta {
    pub user_id: Uuid,
    pub old_score: i32,
    pub new_score: i32,
}

impl ScoreDelta {
    pub fn change(&self) -> i32 {
        self.new_score - self.old_score
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoreSweepReport {
    pub summary: SweepSummary,
    /// Largest improvements first, at most `delta_sample_size`
    pub deltas: Vec<ScoreDelta>,
    pub low_score_count: usize,
}

pub struct ScoreSweepJob {
    service: Arc<CreditScoreService>,
    config: SweepConfig,
}

impl ScoreSweepJob {
    pub fn new(service: Arc<CreditScoreService>, config: SweepConfig) -> Self {
        Self { service, config }
    }

    pub async fn update_all(
        &self,
        now: DateTime<Utc>,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<ScoreSweepReport> {
        let start_time = Instant::now();
        let seekers = self
            .service
            .aggregator()
            .database()
            .list_subjects(SubjectRole::Seeker)
            .await?;

        info!(
            seekers = seekers.len(),
            pacing_ms = self.config.pacing_ms,
            "Starting credit score sweep"
        );

        let mut summary = SweepSummary::start(seekers.len(), now);
        let mut deltas = Vec::new();
        let mut low_score_count = 0;
        let pacing = Duration::from_millis(self.config.pacing_ms);

        for (idx, user_id) in seekers.iter().copied().enumerate() {
            if is_cancelled(&cancel) {
                summary.cancelled = true;
                info!(processed = idx, "Credit score sweep cancelled");
                break;
            }

            match self.service.update_credit_score(user_id, now).await {
                Ok(update) => {
                    summary.succeeded += 1;
                    if update.result.score < LOW_SCORE_THRESHOLD {
                        low_score_count += 1;
                    }
                    deltas.push(ScoreDelta {
                        user_id,
                        old_score: update.previous_score,
                        new_score: update.result.score,
                    });
                    metrics::record_sweep_subject("score", true);
                }
                Err(e) => {
                    error!(user_id = %user_id, error = %e, "Failed to update credit score");
                    summary.record_failure(user_id, &e);
                    metrics::record_sweep_subject("score", false);
                }
            }

            if idx + 1 < seekers.len() {
                pace(pacing, &mut cancel).await;
            }
        }

        // Stable: equal changes keep sweep order
        deltas.sort_by(|a, b| b.change().cmp(&a.change()));
        deltas.truncate(self.config.delta_sample_size);

        summary.finish(start_time.elapsed());

        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            low_scores = low_score_count,
            cancelled = summary.cancelled,
            duration_ms = summary.duration_ms,
            "Credit score sweep completed"
        );

        Ok(ScoreSweepReport {
            summary,
            deltas,
            low_score_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::error::AppError;
    use crate::models::{IncomeFrequency, IncomeStream, Subject, WalletSnapshot};
    use crate::services::credit::InMemoryScoreStore;
    use crate::services::notifier::RecommendationNotifier;
    use crate::services::profile::{
        AggregatorConfig, InMemoryProfileDatabase, MockProfileDatabase, ProfileAggregator,
        ProfileDatabase,
    };

    fn sweep_config() -> SweepConfig {
        SweepConfig {
            pacing_ms: 0,
            ..SweepConfig::default()
        }
    }

    fn job_over(db: Arc<dyn ProfileDatabase>, store: Arc<InMemoryScoreStore>) -> ScoreSweepJob {
        let aggregator = Arc::new(ProfileAggregator::new(db, AggregatorConfig::default()));
        let service = Arc::new(CreditScoreService::new(
            aggregator,
            store,
            Arc::new(RecommendationNotifier::disabled()),
            ScoringConfig::default(),
        ));
        ScoreSweepJob::new(service, sweep_config())
    }

    fn seeker(id: Uuid) -> Subject {
        Subject {
            id,
            role: SubjectRole::Seeker,
            city: None,
            last_active_at: None,
        }
    }

    #[tokio::test]
    async fn test_sweep_reports_top_improvements() {
        let db = InMemoryProfileDatabase::new();
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            db.insert_subject(seeker(*id));
        }
        // Second seeker has a savings goal and income
        db.set_wallet(
            ids[1],
            WalletSnapshot {
                balance: 0.0,
                monthly_savings_goal: 5000.0,
            },
        );
        db.add_income_stream(
            ids[1],
            IncomeStream {
                amount: 500.0,
                frequency: IncomeFrequency::Daily,
                active: true,
            },
        );

        let store = Arc::new(InMemoryScoreStore::new());
        let (_tx, rx) = watch::channel(false);
        let report = job_over(Arc::new(db), store.clone())
            .update_all(Utc::now(), rx)
            .await
            .unwrap();

        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.succeeded, 3);
        assert_eq!(store.len(), 3);
        // 30 + 10 (goal) + 6 (income)
        assert_eq!(report.deltas[0].user_id, ids[1]);
        assert_eq!(report.deltas[0].change(), 16);
        assert_eq!(report.low_score_count, 2);
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let mut db = MockProfileDatabase::new();
        db.expect_list_subjects()
            .returning(|_| Err(AppError::Collaborator("directory unreachable".into())));

        let (_tx, rx) = watch::channel(false);
        let result = job_over(Arc::new(db), Arc::new(InMemoryScoreStore::new()))
            .update_all(Utc::now(), rx)
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let db = InMemoryProfileDatabase::new();
        db.insert_subject(seeker(Uuid::new_v4()));

        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let store = Arc::new(InMemoryScoreStore::new());
        let report = job_over(Arc::new(db), store.clone())
            .update_all(Utc::now(), rx)
            .await
            .unwrap();

        assert!(report.summary.cancelled);
        assert_eq!(report.summary.succeeded, 0);
        assert!(store.is_empty());
    }
}
