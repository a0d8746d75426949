// Utility functions for scoring-service

use chrono::{DateTime, Utc};

/// Days per month used by all tenure math
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Clamp a sub-score to [0, 1]; non-finite values collapse to 0
pub fn clamp_unit(score: f64) -> f64 {
    if !score.is_finite() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Fractional months between two instants, never negative
pub fn months_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let seconds = (end - start).num_seconds() as f64;
    (seconds / 86_400.0 / DAYS_PER_MONTH).max(0.0)
}

/// Case-insensitive substring match in either direction
pub fn fuzzy_contains(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Push `value` unless an equal (case-insensitive) entry already exists
pub fn push_distinct(values: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    if !values.iter().any(|v| v.eq_ignore_ascii_case(value)) {
        values.push(value.to_string());
    }
}
