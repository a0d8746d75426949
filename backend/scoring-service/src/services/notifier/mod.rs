// ============================================
// Recommendation Notifier (通知邊界)
// ============================================
//
// Best-effort dispatch of score changes and top recommendations.
// Every failure (sink error, timeout) is logged and counted here; callers
// only ever see a `bool` telling whether the event went out.

pub mod sinks;

pub use sinks::{LogNotificationSink, RedisNotificationSink};

use crate::config::NotifierConfig;
use crate::error::Result;
use crate::metrics;
use crate::models::Recommendation;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    CreditScoreUpdate {
        user_id: Uuid,
        old_score: i32,
        new_score: i32,
        change: i32,
        message: String,
        created_at: DateTime<Utc>,
    },
    JobRecommendation {
        user_id: Uuid,
        count: usize,
        top_job_id: Uuid,
        top_job_title: Option<String>,
        match_score: f64,
        message: String,
        created_at: DateTime<Utc>,
    },
}

impl NotificationEvent {
    pub fn credit_score_update(user_id: Uuid, old_score: i32, new_score: i32) -> Self {
        let change = new_score - old_score;
        let direction = if change >= 0 { "increased" } else { "decreased" };
        NotificationEvent::CreditScoreUpdate {
            user_id,
            old_score,
            new_score,
            change,
            message: format!(
                "Your credit score has {} by {} points to {}",
                direction,
                change.abs(),
                new_score
            ),
            created_at: Utc::now(),
        }
    }

    pub fn job_recommendation(
        user_id: Uuid,
        count: usize,
        top: &Recommendation,
        top_job_title: Option<String>,
    ) -> Self {
        let message = match &top_job_title {
            Some(title) => format!(
                "We found {} jobs for you. Top match: {} ({:.0}% match)",
                count, title, top.composite_score
            ),
            None => format!(
                "We found {} jobs for you ({:.0}% top match)",
                count, top.composite_score
            ),
        };
        NotificationEvent::JobRecommendation {
            user_id,
            count,
            top_job_id: top.job_id,
            top_job_title,
            match_score: top.composite_score,
            message,
            created_at: Utc::now(),
        }
    }

    pub fn user_id(&self) -> Uuid {
        match self {
            NotificationEvent::CreditScoreUpdate { user_id, .. }
            | NotificationEvent::JobRecommendation { user_id, .. } => *user_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            NotificationEvent::CreditScoreUpdate { .. } => "credit_score_update",
            NotificationEvent::JobRecommendation { .. } => "job_recommendation",
        }
    }
}

/// Delivery transport. Implementations may fail; the notifier absorbs it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, event: &NotificationEvent) -> Result<()>;
}

pub struct RecommendationNotifier {
    sink: Arc<dyn NotificationSink>,
    enabled: bool,
    timeout: Duration,
}

impl RecommendationNotifier {
    pub fn new(sink: Arc<dyn NotificationSink>, config: &NotifierConfig) -> Self {
        Self {
            sink,
            enabled: config.enabled,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Notifier that drops every event
    pub fn disabled() -> Self {
        Self {
            sink: Arc::new(LogNotificationSink),
            enabled: false,
            timeout: Duration::from_millis(0),
        }
    }

    pub async fn notify_score_change(&self, user_id: Uuid, old_score: i32, new_score: i32) -> bool {
        self.dispatch(NotificationEvent::credit_score_update(
            user_id, old_score, new_score,
        ))
        .await
    }

    /// Announce the best recommendation of a ranking run; no-op when empty
    pub async fn notify_recommendations(
        &self,
        seeker_id: Uuid,
        recommendations: &[Recommendation],
        top_job_title: Option<String>,
    ) -> bool {
        let Some(top) = recommendations.first() else {
            return false;
        };
        self.dispatch(NotificationEvent::job_recommendation(
            seeker_id,
            recommendations.len(),
            top,
            top_job_title,
        ))
        .await
    }

    /// Never fails; returns whether the sink accepted the event in time
    pub async fn dispatch(&self, event: NotificationEvent) -> bool {
        let kind = event.kind();
        if !self.enabled {
            metrics::record_notification(kind, "skipped");
            return false;
        }

        match tokio::time::timeout(self.timeout, self.sink.publish(&event)).await {
            Ok(Ok(())) => {
                debug!(user_id = %event.user_id(), kind, "Notification dispatched");
                metrics::record_notification(kind, "sent");
                true
            }
            Ok(Err(e)) => {
                warn!(user_id = %event.user_id(), kind, error = %e, "Notification failed");
                metrics::record_notification(kind, "failed");
                false
            }
            Err(_) => {
                warn!(
                    user_id = %event.user_id(),
                    kind,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Notification timed out"
                );
                metrics::record_notification(kind, "timeout");
                false
            }
        }
    }
}
