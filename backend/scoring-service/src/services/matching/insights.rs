// Aggregate facts over one ranking run: salary, categories, skill gaps.

use crate::models::{JobCandidate, Recommendation, RecommendationInsights, SkillGap};
use std::collections::HashMap;
use uuid::Uuid;

/// Composite score at or above which a recommendation counts as a high match
pub const HIGH_MATCH_SCORE: f64 = 80.0;

const MAX_CATEGORIES: usize = 3;
const MAX_SKILL_GAPS: usize = 5;

pub fn build_insights(
    recommendations: &[Recommendation],
    candidates: &[JobCandidate],
    seeker_skills: &[String],
) -> RecommendationInsights {
    if recommendations.is_empty() {
        return RecommendationInsights::default();
    }

    let by_id: HashMap<Uuid, &JobCandidate> = candidates.iter().map(|j| (j.job_id, j)).collect();
    let jobs: Vec<&JobCandidate> = recommendations
        .iter()
        .filter_map(|r| by_id.get(&r.job_id).copied())
        .collect();

    let average_salary = if jobs.is_empty() {
        0.0
    } else {
        (jobs.iter().map(|j| j.salary.unwrap_or(0.0)).sum::<f64>() / jobs.len() as f64).round()
    };

    let mut top_categories: Vec<String> = Vec::new();
    for category in jobs.iter().filter_map(|j| j.category.as_deref()) {
        if top_categories.len() == MAX_CATEGORIES {
            break;
        }
        if !top_categories.iter().any(|c| c == category) {
            top_categories.push(category.to_string());
        }
    }

    let mut cities: Vec<String> = jobs
        .iter()
        .filter_map(|j| j.city())
        .map(|c| c.to_lowercase())
        .collect();
    cities.sort();
    cities.dedup();

    RecommendationInsights {
        average_salary,
        top_categories,
        skill_gaps: skill_gaps(&jobs, seeker_skills),
        location_diversity: cities.len(),
        high_match_count: recommendations
            .iter()
            .filter(|r| r.composite_score >= HIGH_MATCH_SCORE)
            .count(),
    }
}

/// Required skills the seeker lacks, most demanded first
fn skill_gaps(jobs: &[&JobCandidate], seeker_skills: &[String]) -> Vec<SkillGap> {
    let owned: Vec<String> = seeker_skills.iter().map(|s| s.to_lowercase()).collect();

    // First-seen order breaks ties
    let mut gaps: Vec<SkillGap> = Vec::new();
    for skill in jobs.iter().flat_map(|j| j.required_skills.iter()) {
        if owned.contains(&skill.to_lowercase()) {
            continue;
        }
        match gaps.iter_mut().find(|g| g.skill == *skill) {
            Some(gap) => gap.demand_count += 1,
            None => gaps.push(SkillGap {
                skill: skill.clone(),
                demand_count: 1,
            }),
        }
    }

    gaps.sort_by(|a, b| b.demand_count.cmp(&a.demand_count));
    gaps.truncate(MAX_SKILL_GAPS);
    gaps
}
