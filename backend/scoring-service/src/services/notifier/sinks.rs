// Notification sinks
//
// Redis keys:
// - notifications:{user_id} - List of JSON events, newest first, capped
// - notifications           - Pub/sub channel for push fan-out

use super::{NotificationEvent, NotificationSink};
use crate::error::Result;
use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::info;

/// Writes events to the log; used when no transport is configured
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn publish(&self, event: &NotificationEvent) -> Result<()> {
        let payload = serde_json::to_string(event)?;
        info!(
            user_id = %event.user_id(),
            kind = event.kind(),
            payload = %payload,
            "Notification"
        );
        Ok(())
    }
}

pub struct RedisNotificationSink {
    redis: redis::Client,
    channel: String,
    /// Events kept per user list
    max_events: isize,
}

impl RedisNotificationSink {
    pub fn new(redis: redis::Client) -> Self {
        Self {
            redis,
            channel: "notifications".to_string(),
            max_events: 100,
        }
    }

    fn list_key(&self, event: &NotificationEvent) -> String {
        format!("{}:{}", self.channel, event.user_id())
    }
}

#[async_trait]
impl NotificationSink for RedisNotificationSink {
    async fn publish(&self, event: &NotificationEvent) -> Result<()> {
        let payload = serde_json::to_string(event)?;
        let key = self.list_key(event);

        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        conn.lpush::<_, _, ()>(&key, &payload).await?;
        conn.ltrim::<_, ()>(&key, 0, self.max_events - 1).await?;
        conn.publish::<_, _, ()>(&self.channel, &payload).await?;
        Ok(())
    }
}
