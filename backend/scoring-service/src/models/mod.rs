use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ============================================
// Collaborator records
// ============================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubjectRole {
    Seeker,
    Employer,
    Investor,
    Admin,
}

/// Account as seen by the subject directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    pub role: SubjectRole,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub last_active_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceRecord {
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// Monthly salary of the job held, if known
    #[serde(default)]
    pub salary: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IncomeFrequency {
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "bi-weekly")]
    BiWeekly,
    #[serde(rename = "monthly")]
    Monthly,
}

impl IncomeFrequency {
    /// Multiplier that converts one payment into a monthly equivalent
    pub fn monthly_factor(&self) -> f64 {
        match self {
            IncomeFrequency::Daily => 30.0,
            IncomeFrequency::Weekly => 4.0,
            IncomeFrequency::BiWeekly => 2.0,
            IncomeFrequency::Monthly => 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStream {
    pub amount: f64,
    pub frequency: IncomeFrequency,
    /// Closed streams stay on record but no longer count as income
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub balance: f64,
    pub monthly_savings_goal: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRecord {
    pub name: String,
    #[serde(default)]
    pub years_experience: f64,
    #[serde(default)]
    pub verified: bool,
}

// ============================================
// Profile signals
// ============================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }
}

/// Normalized per-seeker facts consumed by scoring and matching.
///
/// Every field already has its neutral default resolved; scoring code never
/// sees a missing value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSignals {
    pub seeker_id: Uuid,
    pub home_city: Option<String>,
    pub active_job_count: u32,
    pub experience_count: usize,
    /// Tenure of each experience in months (30-day months)
    pub tenure_months: Vec<f64>,
    pub total_experience_months: f64,
    pub active_income_streams: usize,
    pub monthly_income_estimate: f64,
    pub savings_balance: f64,
    pub savings_goal: f64,
    pub skill_set: Vec<String>,
    pub preferred_categories: Vec<String>,
    pub preferred_locations: Vec<String>,
    pub min_expected_salary: f64,
    /// True when `min_expected_salary` is the configured floor rather than history
    pub salary_expectation_is_default: bool,
    pub credit_score: Option<i32>,
    pub risk_tier: RiskTier,
}

impl ProfileSignals {
    /// Signals of a seeker with no records at all
    pub fn empty(seeker_id: Uuid) -> Self {
        Self {
            seeker_id,
            home_city: None,
            active_job_count: 0,
            experience_count: 0,
            tenure_months: Vec::new(),
            total_experience_months: 0.0,
            active_income_streams: 0,
            monthly_income_estimate: 0.0,
            savings_balance: 0.0,
            savings_goal: 0.0,
            skill_set: Vec::new(),
            preferred_categories: Vec::new(),
            preferred_locations: Vec::new(),
            min_expected_salary: 0.0,
            salary_expectation_is_default: true,
            credit_score: None,
            risk_tier: RiskTier::High,
        }
    }
}

// ============================================
// Credit score
// ============================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Improvement advice attached to a score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreAdvice {
    pub priority: Priority,
    pub action: String,
    pub impact: String,
    pub description: String,
}

/// Points contributed by each scoring component
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub savings_goal: f64,
    pub job_count: f64,
    pub salary: f64,
    pub savings_balance: f64,
    pub job_stability: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.base
            + self.savings_goal
            + self.job_count
            + self.salary
            + self.savings_balance
            + self.job_stability
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreResult {
    pub score: i32,
    pub factors: BTreeMap<String, String>,
    pub recommendations: Vec<ScoreAdvice>,
    pub breakdown: ScoreBreakdown,
}

/// Persisted form of a score, one per user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreRecord {
    pub user_id: Uuid,
    pub score: i32,
    pub factors: BTreeMap<String, String>,
    pub computed_at: DateTime<Utc>,
    /// Score before this computation; only used for the notification threshold
    #[serde(default, skip_serializing)]
    pub previous_score: Option<i32>,
}

/// Outcome of a persisted score update
#[derive(Debug, Clone)]
pub struct ScoreUpdate {
    pub result: ScoreResult,
    pub previous_score: i32,
    pub persisted: bool,
    pub notified: bool,
}

impl ScoreUpdate {
    pub fn delta(&self) -> i32 {
        self.result.score - self.previous_score
    }
}

// ============================================
// Jobs & recommendations
// ============================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Active,
    Paused,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobLocation {
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmployerInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobCandidate {
    pub job_id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub location: Option<JobLocation>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub experience_required_months: Option<f64>,
    #[serde(default)]
    pub employer: Option<EmployerInfo>,
    pub created_at: DateTime<Utc>,
}

impl JobCandidate {
    pub fn city(&self) -> Option<&str> {
        self.location
            .as_ref()
            .and_then(|loc| loc.city.as_deref())
            .filter(|c| !c.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct SubScores {
    pub skill: f64,
    pub location: f64,
    pub salary: f64,
    pub experience: f64,
    pub reputation: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub job_id: Uuid,
    pub composite_score: f64,
    pub sub_scores: SubScores,
    pub match_reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillGap {
    pub skill: String,
    pub demand_count: usize,
}

/// Aggregate facts about one ranking run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecommendationInsights {
    pub average_salary: f64,
    pub top_categories: Vec<String>,
    pub skill_gaps: Vec<SkillGap>,
    pub location_diversity: usize,
    pub high_match_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationOutcome {
    pub seeker_id: Uuid,
    pub recommendations: Vec<Recommendation>,
    pub insights: RecommendationInsights,
    /// Optional narrative from the post-processing collaborator
    pub narrative: Option<String>,
    pub risk_tier: RiskTier,
}
