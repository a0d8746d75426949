// ============================================
// Profile Aggregator (畫像聚合器)
// ============================================
//
// Turns raw collaborator records into `ProfileSignals`. This is the only
// place where missing data is resolved to defaults:
// - no wallet        → balance = 0, goal = 0
// - no skills        → empty skill set
// - no income stream → income = 0
// - no history       → min expected salary = configured floor

use super::ProfileDatabase;
use crate::error::{AppError, Result};
use crate::models::{
    ExperienceRecord, IncomeStream, ProfileSignals, RiskTier, SkillRecord, Subject, SubjectRole,
    WalletSnapshot,
};
use crate::services::credit::ScoreStore;
use crate::utils::{months_between, push_distinct};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Expected salary when neither salary history nor income exists
    pub default_salary_floor: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            default_salary_floor: 10000.0,
        }
    }
}

pub struct ProfileAggregator {
    db: Arc<dyn ProfileDatabase>,
    /// Source of the last persisted credit score (feeds the risk tier)
    score_store: Option<Arc<dyn ScoreStore>>,
    config: AggregatorConfig,
}

impl ProfileAggregator {
    pub fn new(db: Arc<dyn ProfileDatabase>, config: AggregatorConfig) -> Self {
        Self {
            db,
            score_store: None,
            config,
        }
    }

    pub fn with_score_store(mut self, store: Arc<dyn ScoreStore>) -> Self {
        self.score_store = Some(store);
        self
    }

    pub fn database(&self) -> &Arc<dyn ProfileDatabase> {
        &self.db
    }

    /// Build signals for one seeker.
    ///
    /// Fails with `InvalidSubject` for unknown or non-seeker accounts; read
    /// failures from collaborators are propagated unchanged.
    pub async fn aggregate(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<ProfileSignals> {
        let subject = self
            .db
            .fetch_subject(user_id)
            .await?
            .ok_or(AppError::InvalidSubject(user_id))?;

        if subject.role != SubjectRole::Seeker {
            return Err(AppError::InvalidSubject(user_id));
        }

        let (experiences, income_streams, wallet, skills) = tokio::try_join!(
            self.db.fetch_experiences(user_id, false),
            self.db.fetch_income_streams(user_id, true),
            self.db.fetch_wallet(user_id),
            self.db.fetch_skills(user_id),
        )?;

        // The stored score only feeds the risk tier; a failed read leaves it unknown
        let credit_score = match &self.score_store {
            Some(store) => match store.load(user_id).await {
                Ok(record) => record.map(|record| record.score),
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Failed to load stored credit score");
                    None
                }
            },
            None => None,
        };

        let signals = self.build_signals(
            &subject,
            &experiences,
            &income_streams,
            wallet,
            &skills,
            credit_score,
            now,
        );

        debug!(
            user_id = %user_id,
            experience_months = signals.total_experience_months,
            monthly_income = signals.monthly_income_estimate,
            skills = signals.skill_set.len(),
            risk_tier = signals.risk_tier.as_str(),
            "Profile signals aggregated"
        );

        Ok(signals)
    }

    /// Fold records into signals; pure given `now`
    #[allow(clippy::too_many_arguments)]
    pub fn build_signals(
        &self,
        subject: &Subject,
        experiences: &[ExperienceRecord],
        income_streams: &[IncomeStream],
        wallet: Option<WalletSnapshot>,
        skills: &[SkillRecord],
        credit_score: Option<i32>,
        now: DateTime<Utc>,
    ) -> ProfileSignals {
        let tenure_months: Vec<f64> = experiences
            .iter()
            .map(|exp| months_between(exp.start, exp.end.unwrap_or(now)))
            .collect();
        let total_experience_months: f64 = tenure_months.iter().sum();
        let active_job_count = experiences.iter().filter(|exp| exp.end.is_none()).count() as u32;

        let monthly_income_estimate = monthly_income(income_streams);

        let mut preferred_categories = Vec::new();
        let mut preferred_locations = Vec::new();
        for exp in experiences {
            if let Some(category) = &exp.category {
                push_distinct(&mut preferred_categories, category);
            }
            if let Some(city) = &exp.city {
                push_distinct(&mut preferred_locations, city);
            }
        }

        let mut skill_set = Vec::new();
        for skill in skills {
            push_distinct(&mut skill_set, &skill.name);
        }

        let salary_history: Vec<f64> = experiences
            .iter()
            .filter_map(|exp| exp.salary)
            .filter(|salary| *salary > 0.0)
            .collect();
        let average_salary = if salary_history.is_empty() {
            0.0
        } else {
            salary_history.iter().sum::<f64>() / salary_history.len() as f64
        };
        let expected = (average_salary * 0.8).max(monthly_income_estimate * 0.9);
        let (min_expected_salary, salary_expectation_is_default) = if expected > 0.0 {
            (expected, false)
        } else {
            (self.config.default_salary_floor, true)
        };

        let wallet = wallet.unwrap_or_default();

        ProfileSignals {
            seeker_id: subject.id,
            home_city: subject
                .city
                .as_ref()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            active_job_count,
            experience_count: experiences.len(),
            tenure_months,
            total_experience_months,
            active_income_streams: income_streams.len(),
            monthly_income_estimate,
            savings_balance: wallet.balance.max(0.0),
            savings_goal: wallet.monthly_savings_goal.max(0.0),
            skill_set,
            preferred_categories,
            preferred_locations,
            min_expected_salary,
            salary_expectation_is_default,
            credit_score,
            risk_tier: risk_tier(
                credit_score.unwrap_or(0),
                total_experience_months,
                monthly_income_estimate,
            ),
        }
    }
}

/// Average monthly equivalent across income streams; 0 without streams
fn monthly_income(streams: &[IncomeStream]) -> f64 {
    if streams.is_empty() {
        return 0.0;
    }
    let total: f64 = streams
        .iter()
        .map(|s| s.amount * s.frequency.monthly_factor())
        .sum();
    total / streams.len() as f64
}

/// Coarse risk bucket from credit score, experience and income
pub fn risk_tier(credit_score: i32, experience_months: f64, monthly_income: f64) -> RiskTier {
    let mut points = 0;

    points += match credit_score {
        s if s >= 80 => 3,
        s if s >= 60 => 2,
        s if s >= 40 => 1,
        _ => 0,
    };

    points += if experience_months >= 24.0 {
        3
    } else if experience_months >= 12.0 {
        2
    } else if experience_months >= 6.0 {
        1
    } else {
        0
    };

    points += if monthly_income >= 50000.0 {
        3
    } else if monthly_income >= 25000.0 {
        2
    } else if monthly_income >= 10000.0 {
        1
    } else {
        0
    };

    if points >= 7 {
        RiskTier::Low
    } else if points >= 4 {
        RiskTier::Medium
    } else {
        RiskTier::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IncomeFrequency;
    use crate::services::credit::MockScoreStore;
    use crate::services::profile::MockProfileDatabase;
    use chrono::Duration;

    fn seeker(id: Uuid) -> Subject {
        Subject {
            id,
            role: SubjectRole::Seeker,
            city: Some("Jaipur".to_string()),
            last_active_at: None,
        }
    }

    fn aggregator_with(db: MockProfileDatabase) -> ProfileAggregator {
        ProfileAggregator::new(Arc::new(db), AggregatorConfig::default())
    }

    #[test]
    fn test_build_signals_defaults() {
        let now = Utc::now();
        let aggregator = aggregator_with(MockProfileDatabase::new());
        let id = Uuid::new_v4();

        let signals = aggregator.build_signals(&seeker(id), &[], &[], None, &[], None, now);

        assert_eq!(signals.savings_balance, 0.0);
        assert_eq!(signals.savings_goal, 0.0);
        assert_eq!(signals.monthly_income_estimate, 0.0);
        assert_eq!(signals.total_experience_months, 0.0);
        assert!(signals.skill_set.is_empty());
        assert_eq!(signals.min_expected_salary, 10000.0);
        assert!(signals.salary_expectation_is_default);
        assert_eq!(signals.risk_tier, RiskTier::High);
    }

    #[test]
    fn test_build_signals_derived_metrics() {
        let now = Utc::now();
        let aggregator = aggregator_with(MockProfileDatabase::new());
        let experiences = vec![
            ExperienceRecord {
                start: now - Duration::days(360),
                end: Some(now - Duration::days(60)),
                category: Some("Plumbing".to_string()),
                city: Some("Jaipur".to_string()),
                salary: Some(20000.0),
            },
            ExperienceRecord {
                start: now - Duration::days(90),
                end: None,
                category: Some("plumbing".to_string()),
                city: Some("Ajmer".to_string()),
                salary: Some(30000.0),
            },
            // Start after end contributes nothing
            ExperienceRecord {
                start: now,
                end: Some(now - Duration::days(30)),
                category: None,
                city: None,
                salary: None,
            },
        ];
        let streams = vec![
            IncomeStream {
                amount: 500.0,
                frequency: IncomeFrequency::Daily,
                active: true,
            },
            IncomeStream {
                amount: 3000.0,
                frequency: IncomeFrequency::Weekly,
                active: true,
            },
        ];

        let signals = aggregator.build_signals(
            &seeker(Uuid::new_v4()),
            &experiences,
            &streams,
            Some(WalletSnapshot {
                balance: 2000.0,
                monthly_savings_goal: 5000.0,
            }),
            &[],
            Some(65),
            now,
        );

        assert!((signals.total_experience_months - 13.0).abs() < 1e-6);
        assert_eq!(signals.active_job_count, 1);
        assert_eq!(signals.experience_count, 3);
        // (15000 + 12000) / 2
        assert!((signals.monthly_income_estimate - 13500.0).abs() < 1e-6);
        // max(0.8 * 25000, 0.9 * 13500)
        assert!((signals.min_expected_salary - 20000.0).abs() < 1e-6);
        assert!(!signals.salary_expectation_is_default);
        assert_eq!(signals.preferred_categories, vec!["Plumbing".to_string()]);
        assert_eq!(
            signals.preferred_locations,
            vec!["Jaipur".to_string(), "Ajmer".to_string()]
        );
        // 2 (score) + 2 (13 months) + 1 (13500 income)
        assert_eq!(signals.risk_tier, RiskTier::Medium);
    }

    #[test]
    fn test_risk_tier_buckets() {
        assert_eq!(risk_tier(85, 30.0, 60000.0), RiskTier::Low);
        assert_eq!(risk_tier(60, 12.0, 0.0), RiskTier::Medium);
        assert_eq!(risk_tier(40, 6.0, 10000.0), RiskTier::High);
        assert_eq!(risk_tier(0, 0.0, 0.0), RiskTier::High);
    }

    #[tokio::test]
    async fn test_aggregate_rejects_missing_subject() {
        let mut db = MockProfileDatabase::new();
        db.expect_fetch_subject().returning(|_| Ok(None));

        let result = aggregator_with(db).aggregate(Uuid::new_v4(), Utc::now()).await;
        assert!(matches!(result, Err(AppError::InvalidSubject(_))));
    }

    #[tokio::test]
    async fn test_aggregate_rejects_non_seeker() {
        let mut db = MockProfileDatabase::new();
        db.expect_fetch_subject().returning(|id| {
            Ok(Some(Subject {
                id,
                role: SubjectRole::Employer,
                city: None,
                last_active_at: None,
            }))
        });

        let result = aggregator_with(db).aggregate(Uuid::new_v4(), Utc::now()).await;
        assert!(matches!(result, Err(AppError::InvalidSubject(_))));
    }

    #[tokio::test]
    async fn test_aggregate_propagates_read_failure() {
        let mut db = MockProfileDatabase::new();
        db.expect_fetch_subject()
            .returning(|id| Ok(Some(seeker(id))));
        db.expect_fetch_experiences()
            .returning(|_, _| Err(AppError::Collaborator("experience store down".into())));
        db.expect_fetch_income_streams().returning(|_, _| Ok(vec![]));
        db.expect_fetch_wallet().returning(|_| Ok(None));
        db.expect_fetch_skills().returning(|_| Ok(vec![]));

        let result = aggregator_with(db).aggregate(Uuid::new_v4(), Utc::now()).await;
        assert!(matches!(result, Err(AppError::Collaborator(_))));
    }

    #[tokio::test]
    async fn test_aggregate_missing_records_resolve_to_defaults() {
        let mut db = MockProfileDatabase::new();
        db.expect_fetch_subject()
            .returning(|id| Ok(Some(seeker(id))));
        db.expect_fetch_experiences().returning(|_, _| Ok(vec![]));
        db.expect_fetch_income_streams()
            .withf(|_, active_only| *active_only)
            .returning(|_, _| Ok(vec![]));
        db.expect_fetch_wallet().returning(|_| Ok(None));
        db.expect_fetch_skills().returning(|_| Ok(vec![]));

        let id = Uuid::new_v4();
        let signals = aggregator_with(db).aggregate(id, Utc::now()).await.unwrap();
        assert_eq!(signals.seeker_id, id);
        assert_eq!(signals.home_city.as_deref(), Some("Jaipur"));
        assert_eq!(signals.savings_goal, 0.0);
        assert_eq!(signals.credit_score, None);
    }

    #[tokio::test]
    async fn test_aggregate_survives_score_store_failure() {
        let mut db = MockProfileDatabase::new();
        db.expect_fetch_subject()
            .returning(|id| Ok(Some(seeker(id))));
        db.expect_fetch_experiences().returning(|_, _| Ok(vec![]));
        db.expect_fetch_income_streams().returning(|_, _| Ok(vec![]));
        db.expect_fetch_wallet().returning(|_| Ok(None));
        db.expect_fetch_skills().returning(|_| Ok(vec![]));

        let mut store = MockScoreStore::new();
        store
            .expect_load()
            .returning(|_| Err(AppError::Redis("read timeout".into())));

        let signals = aggregator_with(db)
            .with_score_store(Arc::new(store))
            .aggregate(Uuid::new_v4(), Utc::now())
            .await
            .unwrap();
        assert_eq!(signals.credit_score, None);
        assert_eq!(signals.risk_tier, RiskTier::High);
    }
}
