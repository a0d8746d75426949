// Optional post-processing over a finished ranking.
//
// A narrator turns recommendations into prose for the seeker. It runs after
// ranking and its failure never invalidates the ranking itself.

use crate::error::Result;
use crate::models::{ProfileSignals, Recommendation};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecommendationNarrator: Send + Sync {
    async fn narrate(
        &self,
        signals: &ProfileSignals,
        recommendations: &[Recommendation],
    ) -> Result<String>;
}

/// Run the narrator if one is configured; errors are logged and dropped
pub async fn narrate_best_effort(
    narrator: Option<&Arc<dyn RecommendationNarrator>>,
    signals: &ProfileSignals,
    recommendations: &[Recommendation],
) -> Option<String> {
    let narrator = narrator?;
    if recommendations.is_empty() {
        return None;
    }

    match narrator.narrate(signals, recommendations).await {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(seeker_id = %signals.seeker_id, error = %e, "Recommendation narrative unavailable");
            None
        }
    }
}
