// ============================================
// Candidate Filter (候選職位過濾)
// ============================================
//
// Narrows the job pool to at most `candidate_limit` jobs, newest first.
//
// Predicate:
//   status == active
//   AND job_id NOT IN exclude
//   AND (city match OR skill match OR category match)   -- vacuous if no criteria
//   AND salary >= min_salary_ratio * min_expected_salary -- skipped for the default floor

use crate::config::MatchingConfig;
use crate::error::Result;
use crate::models::{JobCandidate, JobStatus, ProfileSignals};
use crate::utils::push_distinct;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Filter specification handed to the job collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct JobQuery {
    pub status: JobStatus,
    /// Matched case-insensitively as a substring of the job city
    pub cities: Vec<String>,
    /// Matched against required/preferred skills (exact, case-insensitive) and the title
    pub skill_keywords: Vec<String>,
    pub categories: Vec<String>,
    pub min_salary: Option<f64>,
    pub exclude_job_ids: HashSet<Uuid>,
    pub limit: usize,
}

impl JobQuery {
    fn has_relevance_criteria(&self) -> bool {
        !self.cities.is_empty() || !self.skill_keywords.is_empty() || !self.categories.is_empty()
    }

    fn city_matches(&self, job: &JobCandidate) -> bool {
        let Some(job_city) = job.city() else {
            return false;
        };
        let job_city = job_city.to_lowercase();
        self.cities
            .iter()
            .any(|city| job_city.contains(&city.to_lowercase()))
    }

    fn skill_matches(&self, job: &JobCandidate) -> bool {
        let title = job.title.to_lowercase();
        self.skill_keywords.iter().any(|keyword| {
            job.required_skills
                .iter()
                .chain(job.preferred_skills.iter())
                .any(|skill| skill.eq_ignore_ascii_case(keyword))
                || title.contains(&keyword.to_lowercase())
        })
    }

    fn category_matches(&self, job: &JobCandidate) -> bool {
        job.category.as_ref().map_or(false, |category| {
            self.categories
                .iter()
                .any(|c| c.eq_ignore_ascii_case(category))
        })
    }

    /// Full predicate; the in-memory repository and tests evaluate it directly
    pub fn matches(&self, job: &JobCandidate) -> bool {
        if job.status != self.status || self.exclude_job_ids.contains(&job.job_id) {
            return false;
        }

        if self.has_relevance_criteria()
            && !(self.city_matches(job) || self.skill_matches(job) || self.category_matches(job))
        {
            return false;
        }

        match self.min_salary {
            Some(floor) => job.salary.map_or(false, |salary| salary >= floor),
            None => true,
        }
    }
}

/// Job postings collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Jobs matching `query`, newest first, at most `query.limit`
    async fn find_jobs(&self, query: &JobQuery) -> Result<Vec<JobCandidate>>;
}

#[derive(Debug, Default)]
pub struct InMemoryJobRepository {
    jobs: Vec<JobCandidate>,
}

impl InMemoryJobRepository {
    pub fn new(jobs: Vec<JobCandidate>) -> Self {
        Self { jobs }
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn find_jobs(&self, query: &JobQuery) -> Result<Vec<JobCandidate>> {
        let mut jobs: Vec<JobCandidate> = self
            .jobs
            .iter()
            .filter(|job| query.matches(job))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(query.limit);
        Ok(jobs)
    }
}

pub struct CandidateFilter {
    jobs: Arc<dyn JobRepository>,
    candidate_limit: usize,
    min_salary_ratio: f64,
}

impl CandidateFilter {
    pub fn new(jobs: Arc<dyn JobRepository>, config: &MatchingConfig) -> Self {
        Self {
            jobs,
            candidate_limit: config.candidate_limit,
            min_salary_ratio: config.min_salary_ratio,
        }
    }

    pub fn build_query(&self, signals: &ProfileSignals, exclude_job_ids: &[Uuid]) -> JobQuery {
        let mut cities = Vec::new();
        if let Some(city) = &signals.home_city {
            push_distinct(&mut cities, city);
        }
        for city in &signals.preferred_locations {
            push_distinct(&mut cities, city);
        }

        // Seekers with no skills and no history fall back to location only
        let new_seeker = signals.skill_set.is_empty() && signals.experience_count == 0;
        let (skill_keywords, categories) = if new_seeker {
            (Vec::new(), Vec::new())
        } else {
            (
                signals.skill_set.clone(),
                signals.preferred_categories.clone(),
            )
        };

        let min_salary = if signals.salary_expectation_is_default {
            None
        } else {
            Some(signals.min_expected_salary * self.min_salary_ratio)
        };

        JobQuery {
            status: JobStatus::Active,
            cities,
            skill_keywords,
            categories,
            min_salary,
            exclude_job_ids: exclude_job_ids.iter().copied().collect(),
            limit: self.candidate_limit,
        }
    }

    /// Candidate set for ranking; an empty result means "no recommendations"
    pub async fn filter(
        &self,
        signals: &ProfileSignals,
        exclude_job_ids: &[Uuid],
    ) -> Result<Vec<JobCandidate>> {
        let query = self.build_query(signals, exclude_job_ids);
        let mut candidates = self.jobs.find_jobs(&query).await?;

        // Enforce the contract even for lenient repositories
        candidates.retain(|job| query.matches(job));
        candidates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        candidates.truncate(self.candidate_limit);

        debug!(
            seeker_id = %signals.seeker_id,
            candidates = candidates.len(),
            cities = query.cities.len(),
            skills = query.skill_keywords.len(),
            "Candidate jobs filtered"
        );

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobLocation;
    use chrono::{Duration, Utc};

    fn job(title: &str, city: &str, salary: Option<f64>, age_days: i64) -> JobCandidate {
        JobCandidate {
            job_id: Uuid::new_v4(),
            title: title.to_string(),
            status: JobStatus::Active,
            required_skills: vec![],
            preferred_skills: vec![],
            salary,
            location: Some(JobLocation {
                city: Some(city.to_string()),
            }),
            category: None,
            experience_required_months: None,
            employer: None,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    fn seeker() -> ProfileSignals {
        let mut signals = ProfileSignals::empty(Uuid::new_v4());
        signals.home_city = Some("Surat".to_string());
        signals.skill_set = vec!["Welding".to_string()];
        signals.experience_count = 1;
        signals.min_expected_salary = 20000.0;
        signals.salary_expectation_is_default = false;
        signals
    }

    fn filter_over(jobs: Vec<JobCandidate>, limit: usize) -> CandidateFilter {
        let config = MatchingConfig {
            candidate_limit: limit,
            ..MatchingConfig::default()
        };
        CandidateFilter::new(Arc::new(InMemoryJobRepository::new(jobs)), &config)
    }

    #[tokio::test]
    async fn test_filter_predicate() {
        let mut closed = job("Welder", "Surat", Some(25000.0), 1);
        closed.status = JobStatus::Closed;
        let applied = job("Welder", "Surat", Some(25000.0), 1);
        let cheap = job("Welder", "Surat", Some(10000.0), 1);
        let elsewhere = job("Cook", "Kochi", Some(30000.0), 1);
        let by_title = job("Senior welding technician", "Kochi", Some(30000.0), 2);
        let by_city = job("Driver", "Surat City", Some(15000.0), 3);
        let applied_id = applied.job_id;
        let (title_id, city_id) = (by_title.job_id, by_city.job_id);

        let filter = filter_over(vec![closed, applied, cheap, elsewhere, by_title, by_city], 50);
        let candidates = filter.filter(&seeker(), &[applied_id]).await.unwrap();

        let ids: Vec<Uuid> = candidates.iter().map(|j| j.job_id).collect();
        assert_eq!(ids, vec![title_id, city_id]);
    }

    #[tokio::test]
    async fn test_filter_caps_and_orders_newest_first() {
        let jobs: Vec<JobCandidate> = (0..60)
            .map(|age| job("Welder", "Surat", Some(30000.0), age))
            .collect();
        let candidates = filter_over(jobs, 50).filter(&seeker(), &[]).await.unwrap();

        assert_eq!(candidates.len(), 50);
        assert!(candidates
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn test_new_seeker_query_is_location_only() {
        let mut signals = ProfileSignals::empty(Uuid::new_v4());
        signals.home_city = Some("Patna".to_string());
        signals.preferred_categories = vec!["Cleaning".to_string()];
        signals.min_expected_salary = 10000.0;

        let query = filter_over(vec![], 50).build_query(&signals, &[]);
        assert_eq!(query.cities, vec!["Patna".to_string()]);
        assert!(query.skill_keywords.is_empty());
        assert!(query.categories.is_empty());
        assert_eq!(query.min_salary, None);
    }

    #[test]
    fn test_query_without_criteria_accepts_any_active_job() {
        let query = filter_over(vec![], 50).build_query(&ProfileSignals::empty(Uuid::new_v4()), &[]);
        assert!(query.matches(&job("Anything", "Anywhere", None, 0)));
    }

    #[tokio::test]
    async fn test_empty_pool_is_not_an_error() {
        let candidates = filter_over(vec![], 50).filter(&seeker(), &[]).await.unwrap();
        assert!(candidates.is_empty());
    }
}
