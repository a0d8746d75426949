// ============================================
// Credit Score Calculator (信用評分計算)
// ============================================
//
// score = clamp(round(base + Σ components), 10, 100)
//
// Components:
// - savings goal   (0..15)  goal set, bonuses at 1k / 5k / 10k
// - job count      (0..15)  {0:0, 1:8, 2:12, 3+:15}
// - salary         (0..29)  income sources, bonuses at 10k / 25k / 50k / 100k
// - savings balance (0..5) balance / goal ratio
// - job stability  (0..10)  tenure bucket per experience, capped
//
// Pure: everything time-dependent was resolved by the aggregator.

use crate::models::{Priority, ProfileSignals, ScoreAdvice, ScoreBreakdown, ScoreResult};
use std::collections::BTreeMap;

pub const BASE_SCORE: f64 = 30.0;
pub const MIN_SCORE: i32 = 10;
pub const MAX_SCORE: i32 = 100;

const STABILITY_CAP: f64 = 10.0;
/// Below this many stability points the "maintain stability" advice fires
const STABILITY_ADVICE_THRESHOLD: f64 = 5.0;
/// Job count under which a second income source is suggested
const SECOND_INCOME_THRESHOLD: u32 = 2;

#[derive(Debug, Clone, Default)]
pub struct CreditScoreCalculator;

impl CreditScoreCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn compute_score(&self, signals: &ProfileSignals) -> ScoreResult {
        let breakdown = ScoreBreakdown {
            base: BASE_SCORE,
            savings_goal: savings_goal_points(signals.savings_goal),
            job_count: job_count_points(signals.active_job_count),
            salary: salary_points(signals),
            savings_balance: savings_balance_points(signals.savings_balance, signals.savings_goal),
            job_stability: job_stability_points(&signals.tenure_months),
        };

        let score = (breakdown.total().round() as i32).clamp(MIN_SCORE, MAX_SCORE);

        ScoreResult {
            score,
            factors: factors(signals, &breakdown),
            recommendations: advice(signals, &breakdown),
            breakdown,
        }
    }
}

pub fn savings_goal_points(goal: f64) -> f64 {
    if goal <= 0.0 {
        return 0.0;
    }
    let mut points = 5.0;
    if goal >= 1000.0 {
        points += 2.0;
    }
    if goal >= 5000.0 {
        points += 3.0;
    }
    if goal >= 10000.0 {
        points += 5.0;
    }
    points
}

pub fn job_count_points(active_jobs: u32) -> f64 {
    match active_jobs {
        0 => 0.0,
        1 => 8.0,
        2 => 12.0,
        _ => 15.0,
    }
}

pub fn salary_points(signals: &ProfileSignals) -> f64 {
    let income = signals.monthly_income_estimate;
    if signals.active_income_streams == 0 && income <= 0.0 {
        return 0.0;
    }
    let mut points = 3.0;
    if income >= 10000.0 {
        points += 3.0;
    }
    if income >= 25000.0 {
        points += 5.0;
    }
    if income >= 50000.0 {
        points += 8.0;
    }
    if income >= 100000.0 {
        points += 10.0;
    }
    points
}

pub fn savings_balance_points(balance: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        return 0.0;
    }
    let ratio = balance / goal;
    if ratio >= 1.0 {
        5.0
    } else if ratio >= 0.75 {
        4.0
    } else if ratio >= 0.5 {
        2.0
    } else if ratio >= 0.25 {
        1.0
    } else {
        0.0
    }
}

fn tenure_points(months: f64) -> f64 {
    if months >= 12.0 {
        3.0
    } else if months >= 6.0 {
        2.0
    } else if months >= 3.0 {
        1.0
    } else if months >= 1.0 {
        0.5
    } else {
        0.0
    }
}

pub fn job_stability_points(tenure_months: &[f64]) -> f64 {
    tenure_months
        .iter()
        .map(|m| tenure_points(*m))
        .sum::<f64>()
        .min(STABILITY_CAP)
}

fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("+{}", points as i64)
    } else {
        format!("+{:.1}", points)
    }
}

fn factors(signals: &ProfileSignals, b: &ScoreBreakdown) -> BTreeMap<String, String> {
    let mut factors = BTreeMap::new();

    if b.savings_goal > 0.0 {
        factors.insert(
            "savings_goal".to_string(),
            format!(
                "Monthly savings goal of {:.0} set ({})",
                signals.savings_goal,
                format_points(b.savings_goal)
            ),
        );
    } else {
        factors.insert(
            "no_savings_goal".to_string(),
            "No monthly savings goal set".to_string(),
        );
    }

    if b.job_count > 0.0 {
        factors.insert(
            "employment".to_string(),
            format!(
                "{} active job(s) ({})",
                signals.active_job_count,
                format_points(b.job_count)
            ),
        );
    } else {
        factors.insert(
            "no_employment".to_string(),
            "No active employment".to_string(),
        );
    }

    if b.salary > 0.0 {
        factors.insert(
            "income".to_string(),
            format!(
                "Monthly income of about {:.0} ({})",
                signals.monthly_income_estimate,
                format_points(b.salary)
            ),
        );
    } else {
        factors.insert(
            "no_income_source".to_string(),
            "No active income source".to_string(),
        );
    }

    if b.savings_balance > 0.0 {
        factors.insert(
            "savings_balance".to_string(),
            format!(
                "Savings at {:.0}% of goal ({})",
                signals.savings_balance / signals.savings_goal * 100.0,
                format_points(b.savings_balance)
            ),
        );
    } else if signals.savings_goal > 0.0 {
        factors.insert(
            "low_savings_balance".to_string(),
            "Savings below a quarter of the monthly goal".to_string(),
        );
    }

    if b.job_stability > 0.0 {
        factors.insert(
            "job_stability".to_string(),
            format!(
                "{:.1} months of work history ({})",
                signals.total_experience_months,
                format_points(b.job_stability)
            ),
        );
    } else {
        factors.insert(
            "no_work_history".to_string(),
            "No work history of a month or longer".to_string(),
        );
    }

    factors
}

fn advice(signals: &ProfileSignals, b: &ScoreBreakdown) -> Vec<ScoreAdvice> {
    let mut advice = Vec::new();

    if signals.active_job_count == 0 {
        advice.push(ScoreAdvice {
            priority: Priority::High,
            action: "Find employment".to_string(),
            impact: "+8 to +15 points".to_string(),
            description: "An active job is the largest single lever on your score".to_string(),
        });
    }

    if signals.savings_goal <= 0.0 {
        advice.push(ScoreAdvice {
            priority: Priority::High,
            action: "Set a savings goal".to_string(),
            impact: "+5 to +15 points".to_string(),
            description: "Set a monthly savings goal in your wallet".to_string(),
        });
    }

    if signals.active_job_count >= 1 && signals.active_job_count < SECOND_INCOME_THRESHOLD {
        advice.push(ScoreAdvice {
            priority: Priority::Medium,
            action: "Add a second income source".to_string(),
            impact: "+4 to +7 points".to_string(),
            description: "Taking on another job diversifies your income".to_string(),
        });
    }

    if signals.savings_goal > 0.0 && signals.savings_balance / signals.savings_goal < 0.5 {
        advice.push(ScoreAdvice {
            priority: Priority::Medium,
            action: "Increase savings".to_string(),
            impact: "+2 to +5 points".to_string(),
            description: "Bring your savings balance closer to your monthly goal".to_string(),
        });
    }

    if b.job_stability < STABILITY_ADVICE_THRESHOLD {
        advice.push(ScoreAdvice {
            priority: Priority::Low,
            action: "Maintain job stability".to_string(),
            impact: "up to +10 points".to_string(),
            description: "Staying longer in each job builds your stability record".to_string(),
        });
    }

    // Stable: equal priorities keep the order above
    advice.sort_by_key(|a| a.priority);
    advice
}
