use crate::error::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub redis: Option<RedisConfig>,
    pub scoring: ScoringConfig,
    pub matching: MatchingConfig,
    pub sweep: SweepConfig,
    pub notifier: NotifierConfig,
}

/// Binary-level settings (`SERVICE_*`)
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    /// score-sweep | recommend-sweep | score | recommend
    #[serde(default = "default_run_mode")]
    pub run_mode: String,
    /// JSON snapshot of collaborator data consumed by the in-memory stores
    pub snapshot_path: Option<String>,
    /// Target seeker for single-subject modes
    pub seeker_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

/// Credit score settings (`SCORING_*`)
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Minimum |new - old| that triggers a score change notification
    #[serde(default = "default_notification_threshold")]
    pub notification_threshold: i32,
}

/// Candidate filter and ranker settings (`MATCHING_*`)
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Job salary must be at least this fraction of the seeker's expectation
    #[serde(default = "default_min_salary_ratio")]
    pub min_salary_ratio: f64,
    /// Expected salary used when the seeker has no salary or income history
    #[serde(default = "default_salary_floor")]
    pub default_salary_floor: f64,
}

/// Batch sweep settings (`SWEEP_*`)
#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    /// Delay between subjects (backpressure for downstream collaborators)
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
    /// Delay between subjects for comprehensive recommendation sweeps
    #[serde(default = "default_comprehensive_pacing_ms")]
    pub comprehensive_pacing_ms: u64,
    /// Number of old -> new deltas kept in the sweep summary
    #[serde(default = "default_delta_sample_size")]
    pub delta_sample_size: usize,
    /// Window used to select recently active seekers
    #[serde(default = "default_active_window_days")]
    pub active_window_days: i64,
    /// Recommendation sweep mode: daily (active seekers) | comprehensive
    #[serde(default = "default_sweep_mode")]
    pub mode: String,
}

/// Notification boundary settings (`NOTIFIER_*`)
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_notifier_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_service_name() -> String {
    "scoring-service".to_string()
}

fn default_run_mode() -> String {
    "score-sweep".to_string()
}

fn default_notification_threshold() -> i32 {
    2
}

fn default_candidate_limit() -> usize {
    50
}

fn default_top_k() -> usize {
    5
}

fn default_min_salary_ratio() -> f64 {
    0.7
}

fn default_salary_floor() -> f64 {
    10000.0
}

fn default_pacing_ms() -> u64 {
    1000
}

fn default_comprehensive_pacing_ms() -> u64 {
    2000
}

fn default_delta_sample_size() -> usize {
    5
}

fn default_active_window_days() -> i64 {
    30
}

fn default_sweep_mode() -> String {
    "daily".to_string()
}

fn default_true() -> bool {
    true
}

fn default_notifier_timeout_ms() -> u64 {
    2000
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            notification_threshold: default_notification_threshold(),
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            candidate_limit: default_candidate_limit(),
            top_k: default_top_k(),
            min_salary_ratio: default_min_salary_ratio(),
            default_salary_floor: default_salary_floor(),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
            comprehensive_pacing_ms: default_comprehensive_pacing_ms(),
            delta_sample_size: default_delta_sample_size(),
            active_window_days: default_active_window_days(),
            mode: default_sweep_mode(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: default_notifier_timeout_ms(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let redis = std::env::var("REDIS_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| RedisConfig { url });

        let matching: MatchingConfig = envy::prefixed("MATCHING_").from_env()?;
        if matching.top_k == 0 || matching.candidate_limit == 0 {
            return Err(crate::error::AppError::Configuration(
                "MATCHING_TOP_K and MATCHING_CANDIDATE_LIMIT must be positive".to_string(),
            ));
        }

        Ok(Config {
            service: envy::prefixed("SERVICE_").from_env()?,
            redis,
            scoring: envy::prefixed("SCORING_").from_env()?,
            matching,
            sweep: envy::prefixed("SWEEP_").from_env()?,
            notifier: envy::prefixed("NOTIFIER_").from_env()?,
        })
    }
}
