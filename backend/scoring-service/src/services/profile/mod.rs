// ============================================
// Seeker Profile (求職者畫像)
// ============================================
//
// Collects raw per-seeker records from collaborator stores and folds them
// into `ProfileSignals`:
// 1. Subject lookup (existence + role gate)
// 2. Experience history (tenure, categories, cities, salary history)
// 3. Active income streams (monthly income estimate)
// 4. Wallet (savings balance and goal)
// 5. Skill inventory
//
// Missing records are never errors; the aggregator resolves each one to a
// neutral default in a single place.

pub mod aggregator;
pub mod memory_db;

pub use aggregator::{risk_tier, AggregatorConfig, ProfileAggregator};
pub use memory_db::{InMemoryProfileDatabase, ProfileSnapshot};

use crate::error::Result;
use crate::models::{
    ExperienceRecord, IncomeStream, SkillRecord, Subject, SubjectRole, WalletSnapshot,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Read access to the marketplace records a profile is built from.
/// Implement this trait to plug in the marketplace's document store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileDatabase: Send + Sync {
    /// Look up an account; `None` when it does not exist
    async fn fetch_subject(&self, user_id: Uuid) -> Result<Option<Subject>>;

    /// All accounts holding `role`
    async fn list_subjects(&self, role: SubjectRole) -> Result<Vec<Uuid>>;

    /// Seekers active since `since` (profile updates or recent applications)
    async fn list_active_seekers(&self, since: DateTime<Utc>) -> Result<Vec<Uuid>>;

    /// Work history; `current_only` keeps only experiences without an end date
    async fn fetch_experiences(
        &self,
        seeker_id: Uuid,
        current_only: bool,
    ) -> Result<Vec<ExperienceRecord>>;

    /// Recurring income streams
    async fn fetch_income_streams(
        &self,
        seeker_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<IncomeStream>>;

    async fn fetch_wallet(&self, user_id: Uuid) -> Result<Option<WalletSnapshot>>;

    async fn fetch_skills(&self, user_id: Uuid) -> Result<Vec<SkillRecord>>;

    /// Jobs the seeker already applied to
    async fn fetch_applied_job_ids(&self, seeker_id: Uuid) -> Result<Vec<Uuid>>;
}
