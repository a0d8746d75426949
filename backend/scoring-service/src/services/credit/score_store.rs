// ============================================
// Score Store
// ============================================
//
// One `ScoreRecord` per user, last write wins.
//
// Redis keys:
// - credit_score:{user_id} - JSON-encoded ScoreRecord

use crate::error::{AppError, Result};
use crate::models::ScoreRecord;
use async_trait::async_trait;
use dashmap::DashMap;
use redis::AsyncCommands;
use tracing::debug;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn load(&self, user_id: Uuid) -> Result<Option<ScoreRecord>>;

    /// Insert or replace the record keyed by `record.user_id`
    async fn upsert(&self, record: &ScoreRecord) -> Result<()>;
}

#[derive(Default)]
pub struct InMemoryScoreStore {
    records: DashMap<Uuid, ScoreRecord>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ScoreStore for InMemoryScoreStore {
    async fn load(&self, user_id: Uuid) -> Result<Option<ScoreRecord>> {
        Ok(self.records.get(&user_id).map(|r| r.clone()))
    }

    async fn upsert(&self, record: &ScoreRecord) -> Result<()> {
        self.records.insert(record.user_id, record.clone());
        Ok(())
    }
}

pub struct RedisScoreStore {
    redis: redis::Client,
    key_prefix: String,
}

impl RedisScoreStore {
    pub fn new(redis: redis::Client) -> Self {
        Self {
            redis,
            key_prefix: "credit_score".to_string(),
        }
    }

    fn record_key(&self, user_id: Uuid) -> String {
        format!("{}:{}", self.key_prefix, user_id)
    }
}

#[async_trait]
impl ScoreStore for RedisScoreStore {
    async fn load(&self, user_id: Uuid) -> Result<Option<ScoreRecord>> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(self.record_key(user_id)).await?;

        match raw {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| AppError::collaborator("decode stored credit score", e)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, record: &ScoreRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(self.record_key(record.user_id), json)
            .await?;

        debug!(user_id = %record.user_id, score = record.score, "Score record stored");
        Ok(())
    }
}
