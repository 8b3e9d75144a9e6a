// Prometheus metrics for the API
// Registered once in the default registry, rendered by GET /metrics.

use crate::error::AuthoringError;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    pub static ref AUTHORING_TOTAL: IntCounterVec = register_int_counter_vec!(
        "arena_authoring_total",
        "Authoring and catalog operations by outcome",
        &["operation", "outcome"]
    )
    .unwrap();
    pub static ref JUDGE_SUBMISSIONS_TOTAL: IntCounter = register_int_counter!(
        "arena_judge_submissions_total",
        "Submissions sent to the judge"
    )
    .unwrap();
    pub static ref JUDGE_VALIDATION_SECONDS: Histogram = register_histogram!(
        "arena_judge_validation_seconds",
        "Time spent validating reference solutions against the judge",
        vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    )
    .unwrap();
}

/// Register every metric up front so /metrics lists them before first use.
pub fn init() {
    lazy_static::initialize(&AUTHORING_TOTAL);
    lazy_static::initialize(&JUDGE_SUBMISSIONS_TOTAL);
    lazy_static::initialize(&JUDGE_VALIDATION_SECONDS);
}

pub fn record<T>(operation: &str, result: &Result<T, AuthoringError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    AUTHORING_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Text exposition of every registered metric
pub fn render() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_recorded_outcomes() {
        record("metrics_test", &Ok::<(), AuthoringError>(()));
        record::<()>(
            "metrics_test",
            &Err(AuthoringError::NotFound("missing".to_string())),
        );

        let text = render().unwrap();
        assert!(text.contains("arena_authoring_total"));
        assert!(text.contains("operation=\"metrics_test\""));
        assert!(text.contains("outcome=\"not_found\""));
    }
}
