// ============================================
// In-Memory Profile Database
// ============================================
//
// `ProfileDatabase` backed by process memory. Used by the binary when it is
// fed a JSON snapshot of marketplace records, and by tests.

use super::ProfileDatabase;
use crate::error::{AppError, Result};
use crate::models::{
    ExperienceRecord, IncomeStream, JobCandidate, SkillRecord, Subject, SubjectRole,
    WalletSnapshot,
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Deserialize;
use std::path::Path;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct SubjectRecords {
    experiences: Vec<ExperienceRecord>,
    income_streams: Vec<IncomeStream>,
    wallet: Option<WalletSnapshot>,
    skills: Vec<SkillRecord>,
    applied_job_ids: Vec<Uuid>,
    last_applied_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct InMemoryProfileDatabase {
    subjects: DashMap<Uuid, Subject>,
    records: DashMap<Uuid, SubjectRecords>,
    /// Insertion order, so listings are stable
    order: RwLock<Vec<Uuid>>,
}

impl InMemoryProfileDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_subject(&self, subject: Subject) {
        let id = subject.id;
        if self.subjects.insert(id, subject).is_none() {
            if let Ok(mut order) = self.order.write() {
                order.push(id);
            }
        }
        self.records.entry(id).or_default();
    }

    pub fn add_experience(&self, user_id: Uuid, experience: ExperienceRecord) {
        self.records
            .entry(user_id)
            .or_default()
            .experiences
            .push(experience);
    }

    pub fn add_income_stream(&self, user_id: Uuid, stream: IncomeStream) {
        self.records
            .entry(user_id)
            .or_default()
            .income_streams
            .push(stream);
    }

    pub fn set_wallet(&self, user_id: Uuid, wallet: WalletSnapshot) {
        self.records.entry(user_id).or_default().wallet = Some(wallet);
    }

    pub fn add_skill(&self, user_id: Uuid, skill: SkillRecord) {
        self.records.entry(user_id).or_default().skills.push(skill);
    }

    pub fn add_application(&self, user_id: Uuid, job_id: Uuid, applied_at: DateTime<Utc>) {
        let mut records = self.records.entry(user_id).or_default();
        records.applied_job_ids.push(job_id);
        records.last_applied_at = Some(
            records
                .last_applied_at
                .map_or(applied_at, |prev| prev.max(applied_at)),
        );
    }

    /// Record an application whose time is unknown; it does not mark the seeker active
    pub fn add_undated_application(&self, user_id: Uuid, job_id: Uuid) {
        self.records
            .entry(user_id)
            .or_default()
            .applied_job_ids
            .push(job_id);
    }

    fn ordered_ids(&self) -> Result<Vec<Uuid>> {
        self.order
            .read()
            .map(|order| order.clone())
            .map_err(|_| AppError::Internal("subject index lock poisoned".to_string()))
    }

    fn with_records<T>(&self, user_id: Uuid, f: impl FnOnce(&SubjectRecords) -> T) -> Option<T> {
        self.records.get(&user_id).map(|records| f(&records))
    }
}

#[async_trait]
impl ProfileDatabase for InMemoryProfileDatabase {
    async fn fetch_subject(&self, user_id: Uuid) -> Result<Option<Subject>> {
        Ok(self.subjects.get(&user_id).map(|s| s.clone()))
    }

    async fn list_subjects(&self, role: SubjectRole) -> Result<Vec<Uuid>> {
        Ok(self
            .ordered_ids()?
            .into_iter()
            .filter(|id| {
                self.subjects
                    .get(id)
                    .map_or(false, |subject| subject.role == role)
            })
            .collect())
    }

    async fn list_active_seekers(&self, since: DateTime<Utc>) -> Result<Vec<Uuid>> {
        Ok(self
            .ordered_ids()?
            .into_iter()
            .filter(|id| {
                let Some(subject) = self.subjects.get(id) else {
                    return false;
                };
                if subject.role != SubjectRole::Seeker {
                    return false;
                }
                let profile_active = subject.last_active_at.map_or(false, |at| at >= since);
                let applied_recently = self
                    .with_records(*id, |r| r.last_applied_at.map_or(false, |at| at >= since))
                    .unwrap_or(false);
                profile_active || applied_recently
            })
            .collect())
    }

    async fn fetch_experiences(
        &self,
        seeker_id: Uuid,
        current_only: bool,
    ) -> Result<Vec<ExperienceRecord>> {
        Ok(self
            .with_records(seeker_id, |r| {
                r.experiences
                    .iter()
                    .filter(|exp| !current_only || exp.end.is_none())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_income_streams(
        &self,
        seeker_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<IncomeStream>> {
        Ok(self
            .with_records(seeker_id, |r| {
                r.income_streams
                    .iter()
                    .filter(|stream| !active_only || stream.active)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_wallet(&self, user_id: Uuid) -> Result<Option<WalletSnapshot>> {
        Ok(self.with_records(user_id, |r| r.wallet.clone()).flatten())
    }

    async fn fetch_skills(&self, user_id: Uuid) -> Result<Vec<SkillRecord>> {
        Ok(self
            .with_records(user_id, |r| r.skills.clone())
            .unwrap_or_default())
    }

    async fn fetch_applied_job_ids(&self, seeker_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(self
            .with_records(seeker_id, |r| r.applied_job_ids.clone())
            .unwrap_or_default())
    }
}

// ============================================
// JSON snapshot
// ============================================

#[derive(Debug, Deserialize)]
pub struct SubjectEntry {
    #[serde(flatten)]
    pub subject: Subject,
    #[serde(default)]
    pub experiences: Vec<ExperienceRecord>,
    #[serde(default)]
    pub income_streams: Vec<IncomeStream>,
    #[serde(default)]
    pub wallet: Option<WalletSnapshot>,
    #[serde(default)]
    pub skills: Vec<SkillRecord>,
    #[serde(default)]
    pub applied_job_ids: Vec<Uuid>,
    /// When the most recent application was made, if exported
    #[serde(default)]
    pub last_applied_at: Option<DateTime<Utc>>,
}

/// Marketplace records exported as one JSON document
#[derive(Debug, Deserialize)]
pub struct ProfileSnapshot {
    #[serde(default)]
    pub subjects: Vec<SubjectEntry>,
    #[serde(default)]
    pub jobs: Vec<JobCandidate>,
}

impl ProfileSnapshot {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse snapshot {}", path.display()))
    }

    /// Split into the profile database and the job pool
    pub fn into_parts(self) -> (InMemoryProfileDatabase, Vec<JobCandidate>) {
        let db = InMemoryProfileDatabase::new();
        for entry in self.subjects {
            let id = entry.subject.id;
            let applied_at = entry.last_applied_at;
            db.insert_subject(entry.subject);
            for exp in entry.experiences {
                db.add_experience(id, exp);
            }
            for stream in entry.income_streams {
                db.add_income_stream(id, stream);
            }
            if let Some(wallet) = entry.wallet {
                db.set_wallet(id, wallet);
            }
            for skill in entry.skills {
                db.add_skill(id, skill);
            }
            for job_id in entry.applied_job_ids {
                match applied_at {
                    Some(at) => db.add_application(id, job_id, at),
                    None => db.add_undated_application(id, job_id),
                }
            }
        }
        (db, self.jobs)
    }
}
