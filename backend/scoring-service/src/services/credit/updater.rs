// ============================================
// Credit Score Service
// ============================================
//
// Flow for one seeker:
// 1. Aggregate profile signals (the only step allowed to fail)
// 2. Compute the score
// 3. Resolve the prior score (persisted record, else base)
// 4. Upsert the ScoreRecord
// 5. Notify when |new - prior| >= threshold

use super::calculator::{CreditScoreCalculator, BASE_SCORE};
use super::ScoreStore;
use crate::config::ScoringConfig;
use crate::error::Result;
use crate::metrics;
use crate::models::{ScoreRecord, ScoreResult, ScoreUpdate};
use crate::services::notifier::RecommendationNotifier;
use crate::services::profile::ProfileAggregator;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct CreditScoreService {
    aggregator: Arc<ProfileAggregator>,
    calculator: CreditScoreCalculator,
    store: Arc<dyn ScoreStore>,
    notifier: Arc<RecommendationNotifier>,
    config: ScoringConfig,
}

impl CreditScoreService {
    pub fn new(
        aggregator: Arc<ProfileAggregator>,
        store: Arc<dyn ScoreStore>,
        notifier: Arc<RecommendationNotifier>,
        config: ScoringConfig,
    ) -> Self {
        Self {
            aggregator,
            calculator: CreditScoreCalculator::new(),
            store,
            notifier,
            config,
        }
    }

    pub fn aggregator(&self) -> &Arc<ProfileAggregator> {
        &self.aggregator
    }

    /// Score a seeker without persisting anything
    pub async fn compute_credit_score(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<ScoreResult> {
        let signals = self.aggregator.aggregate(user_id, now).await?;
        let result = self.calculator.compute_score(&signals);
        metrics::record_score_computed();
        Ok(result)
    }

    /// Score, persist and maybe notify.
    ///
    /// Only aggregation errors are returned; store and notifier failures are
    /// logged and reported through `ScoreUpdate::persisted` / `notified`.
    pub async fn update_credit_score(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<ScoreUpdate> {
        let signals = self.aggregator.aggregate(user_id, now).await?;
        let result = self.calculator.compute_score(&signals);
        metrics::record_score_computed();

        let previous_score = match signals.credit_score {
            Some(score) => score,
            None => self.load_previous(user_id).await,
        };

        let record = ScoreRecord {
            user_id,
            score: result.score,
            factors: result.factors.clone(),
            computed_at: now,
            previous_score: Some(previous_score),
        };

        let persisted = match self.store.upsert(&record).await {
            Ok(()) => true,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to persist credit score");
                false
            }
        };

        let delta = result.score - previous_score;
        let notified = if delta.abs() >= self.config.notification_threshold {
            self.notifier
                .notify_score_change(user_id, previous_score, result.score)
                .await
        } else {
            debug!(user_id = %user_id, delta, "Score change below notification threshold");
            false
        };

        info!(
            user_id = %user_id,
            previous_score,
            score = result.score,
            delta,
            persisted,
            notified,
            "Credit score updated"
        );

        Ok(ScoreUpdate {
            result,
            previous_score,
            persisted,
            notified,
        })
    }

    async fn load_previous(&self, user_id: Uuid) -> i32 {
        match self.store.load(user_id).await {
            Ok(Some(record)) => record.score,
            Ok(None) => BASE_SCORE as i32,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to load prior score, using base");
                BASE_SCORE as i32
            }
        }
    }
}
