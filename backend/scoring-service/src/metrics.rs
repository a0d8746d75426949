use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts};

static SCORES_COMPUTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "scoring_service_scores_computed_total",
        "Credit scores computed by scoring-service",
    )
    .expect("failed to create scoring_service_scores_computed_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register scoring_service_scores_computed_total");
    counter
});

static SWEEP_SUBJECTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "scoring_service_sweep_subjects_total",
            "Subjects processed by batch sweeps",
        ),
        &["sweep", "outcome"],
    )
    .expect("failed to create scoring_service_sweep_subjects_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register scoring_service_sweep_subjects_total");
    counter
});

static NOTIFICATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "scoring_service_notifications_total",
            "Notification dispatch attempts",
        ),
        &["kind", "outcome"],
    )
    .expect("failed to create scoring_service_notifications_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register scoring_service_notifications_total");
    counter
});

static RECOMMENDATIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "scoring_service_recommendations_total",
        "Job recommendations produced by ranking runs",
    )
    .expect("failed to create scoring_service_recommendations_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register scoring_service_recommendations_total");
    counter
});

pub fn record_score_computed() {
    SCORES_COMPUTED_TOTAL.inc();
}

pub fn record_sweep_subject(sweep: &str, succeeded: bool) {
    let outcome = if succeeded { "success" } else { "failure" };
    SWEEP_SUBJECTS_TOTAL
        .with_label_values(&[sweep, outcome])
        .inc();
}

pub fn record_notification(kind: &str, outcome: &str) {
    NOTIFICATIONS_TOTAL.with_label_values(&[kind, outcome]).inc();
}

pub fn record_recommendations(count: usize) {
    RECOMMENDATIONS_TOTAL.inc_by(count as u64);
}

/// Render the default registry in the text exposition format
pub fn gather_text() -> String {
    use prometheus::{Encoder, TextEncoder};

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder.encode(&prometheus::gather(), &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_exported() {
        record_score_computed();
        record_sweep_subject("score", true);
        record_notification("credit_score_update", "sent");
        record_recommendations(3);

        let text = gather_text();
        assert!(text.contains("scoring_service_scores_computed_total"));
        assert!(text.contains("scoring_service_sweep_subjects_total"));
        assert!(text.contains("scoring_service_recommendations_total"));
    }
}
