// ============================================
// Job Matching (職位推薦)
// ============================================
//
// Pipeline for one seeker:
//   ProfileAggregator → CandidateFilter → CandidateRanker → top-K
//     → insights → optional narrative → notifier (top result)
//
// Jobs the seeker already applied to are excluded before filtering.

pub mod filter;
pub mod insights;
pub mod narrator;
pub mod ranker;

pub use filter::{CandidateFilter, InMemoryJobRepository, JobQuery, JobRepository};
pub use insights::build_insights;
pub use narrator::RecommendationNarrator;
pub use ranker::{CandidateRanker, MatchWeights};

use crate::config::MatchingConfig;
use crate::error::Result;
use crate::metrics;
use crate::models::RecommendationOutcome;
use crate::services::notifier::RecommendationNotifier;
use crate::services::profile::ProfileAggregator;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct RecommendationService {
    aggregator: Arc<ProfileAggregator>,
    filter: CandidateFilter,
    ranker: CandidateRanker,
    notifier: Arc<RecommendationNotifier>,
    narrator: Option<Arc<dyn RecommendationNarrator>>,
}

impl RecommendationService {
    pub fn new(
        aggregator: Arc<ProfileAggregator>,
        jobs: Arc<dyn JobRepository>,
        notifier: Arc<RecommendationNotifier>,
        config: &MatchingConfig,
    ) -> Self {
        Self {
            aggregator,
            filter: CandidateFilter::new(jobs, config),
            ranker: CandidateRanker::new(config.top_k, config.default_salary_floor),
            notifier,
            narrator: None,
        }
    }

    pub fn with_narrator(mut self, narrator: Arc<dyn RecommendationNarrator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    pub fn aggregator(&self) -> &Arc<ProfileAggregator> {
        &self.aggregator
    }

    /// Ranked recommendations for one seeker.
    ///
    /// Errors come only from aggregation and collaborator reads; an empty
    /// candidate pool yields an empty outcome.
    pub async fn recommend_jobs(
        &self,
        seeker_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RecommendationOutcome> {
        let signals = self.aggregator.aggregate(seeker_id, now).await?;
        let applied = self
            .aggregator
            .database()
            .fetch_applied_job_ids(seeker_id)
            .await?;

        let candidates = self.filter.filter(&signals, &applied).await?;
        if candidates.is_empty() {
            info!(seeker_id = %seeker_id, "No suitable jobs found");
            return Ok(RecommendationOutcome {
                seeker_id,
                recommendations: Vec::new(),
                insights: Default::default(),
                narrative: None,
                risk_tier: signals.risk_tier,
            });
        }

        let recommendations = self.ranker.rank(&candidates, &signals);
        let insights = build_insights(&recommendations, &candidates, &signals.skill_set);
        let narrative =
            narrator::narrate_best_effort(self.narrator.as_ref(), &signals, &recommendations).await;

        let top_title = recommendations.first().and_then(|top| {
            candidates
                .iter()
                .find(|job| job.job_id == top.job_id)
                .map(|job| job.title.clone())
                .filter(|title| !title.is_empty())
        });
        self.notifier
            .notify_recommendations(seeker_id, &recommendations, top_title)
            .await;

        metrics::record_recommendations(recommendations.len());
        info!(
            seeker_id = %seeker_id,
            candidates = candidates.len(),
            recommendations = recommendations.len(),
            high_matches = insights.high_match_count,
            "Job recommendations generated"
        );

        Ok(RecommendationOutcome {
            seeker_id,
            recommendations,
            insights,
            narrative,
            risk_tier: signals.risk_tier,
        })
    }
}
