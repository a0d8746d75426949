// ============================================
// Candidate Ranker (候選職位排序)
// ============================================
//
// composite = Σ weight_i × sub_score_i, weights sum to 100
//
// | Sub-score  | Weight |
// |------------|--------|
// | skill      | 40     |
// | location   | 20     |
// | salary     | 25     |
// | experience | 10     |
// | reputation | 5      |
//
// Every sub-score lies in [0, 1]; a missing input maps to a neutral value.

use crate::models::{EmployerInfo, JobCandidate, ProfileSignals, Recommendation, SubScores};
use crate::utils::{clamp_unit, fuzzy_contains};
use std::cmp::Ordering;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchWeights {
    pub skill: f64,
    pub location: f64,
    pub salary: f64,
    pub experience: f64,
    pub reputation: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            skill: 40.0,
            location: 20.0,
            salary: 25.0,
            experience: 10.0,
            reputation: 5.0,
        }
    }
}

impl MatchWeights {
    pub fn composite(&self, s: &SubScores) -> f64 {
        self.skill * s.skill
            + self.location * s.location
            + self.salary * s.salary
            + self.experience * s.experience
            + self.reputation * s.reputation
    }
}

const NEUTRAL: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct CandidateRanker {
    weights: MatchWeights,
    top_k: usize,
    /// Used when the seeker has no salary expectation of their own
    default_salary_floor: f64,
}

impl CandidateRanker {
    pub fn new(top_k: usize, default_salary_floor: f64) -> Self {
        Self {
            weights: MatchWeights::default(),
            top_k,
            default_salary_floor,
        }
    }

    pub fn score_candidate(&self, job: &JobCandidate, signals: &ProfileSignals) -> Recommendation {
        let expected_salary = if signals.min_expected_salary > 0.0 {
            signals.min_expected_salary
        } else {
            self.default_salary_floor
        };

        let sub_scores = SubScores {
            skill: skill_match(job, &signals.skill_set),
            location: location_match(job.city(), signals.home_city.as_deref()),
            salary: salary_match(job.salary, expected_salary),
            experience: experience_match(
                signals.total_experience_months,
                job.experience_required_months,
            ),
            reputation: reputation_match(job.employer.as_ref()),
        };

        Recommendation {
            job_id: job.job_id,
            composite_score: self.weights.composite(&sub_scores),
            match_reasons: match_reasons(&sub_scores),
            sub_scores,
        }
    }

    /// Score every candidate, stable-sort descending, keep the top K.
    /// Ties keep the filter's (newest-first) order.
    pub fn rank(&self, candidates: &[JobCandidate], signals: &ProfileSignals) -> Vec<Recommendation> {
        let mut scored: Vec<Recommendation> = candidates
            .iter()
            .map(|job| self.score_candidate(job, signals))
            .collect();

        scored.sort_by(|a, b| {
            b.composite_score
                .partial_cmp(&a.composite_score)
                .unwrap_or(Ordering::Equal)
        });
        scored.truncate(self.top_k);

        debug!(
            seeker_id = %signals.seeker_id,
            candidates = candidates.len(),
            returned = scored.len(),
            top_score = scored.first().map(|r| r.composite_score).unwrap_or(0.0),
            "Candidates ranked"
        );

        scored
    }
}

/// Share of `job_skills` covered by at least one seeker skill
fn coverage(job_skills: &[&String], seeker_skills: &[String]) -> f64 {
    if job_skills.is_empty() {
        return 1.0;
    }
    let covered = job_skills
        .iter()
        .filter(|job_skill| seeker_skills.iter().any(|s| fuzzy_contains(job_skill, s)))
        .count();
    covered as f64 / job_skills.len() as f64
}

pub fn skill_match(job: &JobCandidate, seeker_skills: &[String]) -> f64 {
    let required: Vec<&String> = job.required_skills.iter().collect();
    let all: Vec<&String> = job
        .required_skills
        .iter()
        .chain(job.preferred_skills.iter())
        .collect();

    if all.is_empty() {
        return NEUTRAL;
    }

    clamp_unit(0.7 * coverage(&required, seeker_skills) + 0.3 * coverage(&all, seeker_skills))
}

pub fn location_match(job_city: Option<&str>, seeker_city: Option<&str>) -> f64 {
    let (Some(job_city), Some(seeker_city)) = (job_city, seeker_city) else {
        return NEUTRAL;
    };
    let job_city = job_city.trim().to_lowercase();
    let seeker_city = seeker_city.trim().to_lowercase();

    if job_city == seeker_city {
        1.0
    } else if job_city.contains(&seeker_city) || seeker_city.contains(&job_city) {
        0.8
    } else if job_city
        .split_whitespace()
        .any(|token| seeker_city.split_whitespace().any(|t| t == token))
    {
        0.6
    } else {
        0.3
    }
}

pub fn salary_match(job_salary: Option<f64>, expected_salary: f64) -> f64 {
    let salary = match job_salary {
        Some(s) if s > 0.0 => s,
        _ => return NEUTRAL,
    };
    if expected_salary <= 0.0 {
        return NEUTRAL;
    }

    let ratio = salary / expected_salary;
    if ratio >= 1.5 {
        1.0
    } else if ratio >= 1.2 {
        0.9
    } else if ratio >= 1.0 {
        0.8
    } else if ratio >= 0.8 {
        0.6
    } else if ratio >= 0.6 {
        0.4
    } else {
        0.2
    }
}

pub fn experience_match(seeker_months: f64, required_months: Option<f64>) -> f64 {
    let required = match required_months {
        Some(r) if r > 0.0 => r,
        _ => return 0.8,
    };

    let ratio = seeker_months / required;
    if ratio >= 1.5 {
        // Overqualified
        0.9
    } else if ratio >= 1.0 {
        1.0
    } else if ratio >= 0.8 {
        0.8
    } else if ratio >= 0.6 {
        0.6
    } else {
        0.3
    }
}

pub fn reputation_match(employer: Option<&EmployerInfo>) -> f64 {
    let Some(employer) = employer else {
        return NEUTRAL;
    };

    // Bonuses counted in tenths so a full house lands exactly on 1.0
    let mut tenths: u32 = 5;
    if employer
        .name
        .as_deref()
        .map_or(false, |name| !name.trim().is_empty())
    {
        tenths += 2;
    }
    if employer.verified {
        tenths += 2;
    }
    if employer.rating.map_or(false, |rating| rating > 4.0) {
        tenths += 1;
    }
    f64::from(tenths.min(10)) / 10.0
}

fn match_reasons(s: &SubScores) -> Vec<String> {
    let mut reasons = Vec::new();

    if s.skill > 0.7 {
        reasons.push(format!("Strong skill match ({:.0}%)", s.skill * 100.0));
    } else if s.skill > 0.4 {
        reasons.push(format!("Good skill match ({:.0}%)", s.skill * 100.0));
    }

    if s.location > 0.8 {
        reasons.push("Excellent location match".to_string());
    } else if s.location > 0.5 {
        reasons.push("Good location match".to_string());
    }

    if s.salary > 0.8 {
        reasons.push("Excellent salary offer".to_string());
    } else if s.salary > 0.6 {
        reasons.push("Good salary offer".to_string());
    }

    if s.experience > 0.8 {
        reasons.push("Ideal experience level".to_string());
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobLocation, JobStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn job(required: &[&str], preferred: &[&str]) -> JobCandidate {
        JobCandidate {
            job_id: Uuid::new_v4(),
            title: String::new(),
            status: JobStatus::Active,
            required_skills: required.iter().map(|s| s.to_string()).collect(),
            preferred_skills: preferred.iter().map(|s| s.to_string()).collect(),
            salary: None,
            location: None,
            category: None,
            experience_required_months: None,
            employer: None,
            created_at: Utc::now(),
        }
    }

    fn skills(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_skill_match_neutral_without_skills() {
        assert_eq!(skill_match(&job(&[], &[]), &[]), 0.5);
        assert_eq!(skill_match(&job(&[], &[]), &skills(&["Painting"])), 0.5);
    }

    #[test]
    fn test_skill_match_weights_required() {
        let j = job(&["Plumbing", "Pipe fitting"], &["Welding", "Driving"]);
        // required 1/2, all 1/4
        let score = skill_match(&j, &skills(&["plumb"]));
        assert!((score - (0.7 * 0.5 + 0.3 * 0.25)).abs() < 1e-9);

        // no required skills counts as full required coverage
        let j = job(&[], &["Welding", "Driving"]);
        let score = skill_match(&j, &skills(&["Welding"]));
        assert!((score - (0.7 + 0.3 * 0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_location_match_tiers() {
        assert_eq!(location_match(Some("Pune"), Some("pune")), 1.0);
        assert_eq!(location_match(Some("New Delhi"), Some("Delhi")), 0.8);
        assert_eq!(location_match(Some("Navi Mumbai East"), Some("Mumbai West")), 0.6);
        assert_eq!(location_match(Some("Chennai"), Some("Lucknow")), 0.3);
        assert_eq!(location_match(None, Some("Lucknow")), 0.5);
        assert_eq!(location_match(Some("Chennai"), None), 0.5);
    }

    #[test]
    fn test_salary_tiers() {
        let expected = 10000.0;
        let cases = [
            (Some(15000.0), 1.0),
            (Some(14999.0), 0.9),
            (Some(12000.0), 0.9),
            (Some(11999.0), 0.8),
            (Some(10000.0), 0.8),
            (Some(9999.0), 0.6),
            (Some(8000.0), 0.6),
            (Some(7999.0), 0.4),
            (Some(6000.0), 0.4),
            (Some(5999.0), 0.2),
            (Some(5000.0), 0.2),
            (None, 0.5),
            (Some(0.0), 0.5),
        ];
        for (salary, score) in cases {
            assert_eq!(salary_match(salary, expected), score, "salary {:?}", salary);
        }
        assert_eq!(salary_match(Some(12000.0), 0.0), 0.5);
    }

    #[test]
    fn test_experience_tiers() {
        let cases = [
            (3.0, None, 0.8),
            (3.0, Some(0.0), 0.8),
            (20.0, Some(12.0), 0.9),
            (18.0, Some(12.0), 0.9),
            (17.9, Some(12.0), 1.0),
            (12.0, Some(12.0), 1.0),
            (11.9, Some(12.0), 0.8),
            (9.6, Some(16.0), 0.6),
            (12.0, Some(15.0), 0.8),
            (9.5, Some(12.0), 0.6),
            (7.2, Some(12.0), 0.6),
            (7.1, Some(12.0), 0.3),
            (2.0, Some(12.0), 0.3),
        ];
        for (months, required, score) in cases {
            assert_eq!(
                experience_match(months, required),
                score,
                "{} months vs {:?}",
                months,
                required
            );
        }
    }

    #[test]
    fn test_reputation_capped() {
        assert_eq!(reputation_match(None), 0.5);
        let employer = EmployerInfo {
            name: Some("Shakti Builders".to_string()),
            verified: true,
            rating: Some(4.6),
        };
        assert_eq!(reputation_match(Some(&employer)), 1.0);
        let anonymous = EmployerInfo::default();
        assert_eq!(reputation_match(Some(&anonymous)), 0.5);

        let verified_only = EmployerInfo {
            verified: true,
            ..EmployerInfo::default()
        };
        assert_eq!(reputation_match(Some(&verified_only)), 0.7);
        let named_low_rating = EmployerInfo {
            name: Some("Ravi Traders".to_string()),
            verified: false,
            rating: Some(3.9),
        };
        assert_eq!(reputation_match(Some(&named_low_rating)), 0.7);
    }

    #[test]
    fn test_full_reputation_gives_full_composite() {
        let mut j = job(&["Tiling"], &[]);
        j.location = Some(JobLocation {
            city: Some("Indore".to_string()),
        });
        j.salary = Some(30000.0);
        j.experience_required_months = Some(12.0);
        j.employer = Some(EmployerInfo {
            name: Some("Shakti Builders".to_string()),
            verified: true,
            rating: Some(4.8),
        });

        let mut signals = ProfileSignals::empty(Uuid::new_v4());
        signals.skill_set = skills(&["Tiling"]);
        signals.home_city = Some("Indore".to_string());
        signals.min_expected_salary = 20000.0;
        signals.total_experience_months = 12.0;

        let rec = CandidateRanker::new(5, 10000.0).score_candidate(&j, &signals);
        assert_eq!(rec.sub_scores.reputation, 1.0);
        assert_eq!(rec.composite_score, 100.0);
    }

    #[test]
    fn test_location_ignores_past_work_cities() {
        let mut j = job(&[], &[]);
        j.location = Some(JobLocation {
            city: Some("Chennai".to_string()),
        });

        let mut signals = ProfileSignals::empty(Uuid::new_v4());
        signals.preferred_locations = vec!["Pune".to_string()];

        let rec = CandidateRanker::new(5, 10000.0).score_candidate(&j, &signals);
        assert_eq!(rec.sub_scores.location, 0.5);

        signals.home_city = Some("Chennai".to_string());
        let rec = CandidateRanker::new(5, 10000.0).score_candidate(&j, &signals);
        assert_eq!(rec.sub_scores.location, 1.0);
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let mut signals = ProfileSignals::empty(Uuid::new_v4());
        signals.skill_set = skills(&["Masonry"]);

        let candidates: Vec<JobCandidate> = (0..8)
            .map(|i| {
                if i % 3 == 0 {
                    job(&["Masonry"], &[])
                } else {
                    job(&["Electrical"], &[])
                }
            })
            .collect();

        let ranked = CandidateRanker::new(5, 10000.0).rank(&candidates, &signals);

        assert_eq!(ranked.len(), 5);
        assert!(ranked
            .windows(2)
            .all(|w| w[0].composite_score >= w[1].composite_score));
        // Masonry jobs (0, 3, 6) lead, in input order
        let leaders: Vec<Uuid> = ranked.iter().take(3).map(|r| r.job_id).collect();
        assert_eq!(
            leaders,
            vec![candidates[0].job_id, candidates[3].job_id, candidates[6].job_id]
        );
        // Ties among the rest keep input order as well
        assert_eq!(ranked[3].job_id, candidates[1].job_id);
        assert_eq!(ranked[4].job_id, candidates[2].job_id);
    }

    #[test]
    fn test_match_reasons() {
        let mut j = job(&["Carpentry"], &[]);
        j.location = Some(JobLocation {
            city: Some("Bhopal".to_string()),
        });
        j.salary = Some(40000.0);
        j.experience_required_months = Some(12.0);

        let mut signals = ProfileSignals::empty(Uuid::new_v4());
        signals.skill_set = skills(&["Carpentry"]);
        signals.home_city = Some("Bhopal".to_string());
        signals.min_expected_salary = 20000.0;
        signals.total_experience_months = 14.0;

        let rec = CandidateRanker::new(5, 10000.0).score_candidate(&j, &signals);
        assert_eq!(
            rec.match_reasons,
            vec![
                "Strong skill match (100%)".to_string(),
                "Excellent location match".to_string(),
                "Excellent salary offer".to_string(),
                "Ideal experience level".to_string(),
            ]
        );
        // 40 + 20 + 25 + 10 + 2.5
        assert!((rec.composite_score - 97.5).abs() < 1e-9);
    }
}
