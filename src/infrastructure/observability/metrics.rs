//! Metric facade counters
//!
//! No exporter is installed here; until the host installs a recorder these
//! calls are no-ops.

use std::time::Duration;

use metrics::{counter, histogram};

/// Parameters for generation request metrics
pub struct GenerationMetricParams<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    pub duration: Duration,
    pub success: bool,
    pub total_tokens: Option<u64>,
}

/// Record one call to a generation provider
pub fn record_generation_request(params: GenerationMetricParams) {
    let labels = [
        ("provider", params.provider.to_string()),
        ("model", params.model.to_string()),
        ("status", status_label(params.success).to_string()),
    ];

    counter!("generation_requests_total", &labels).increment(1);
    histogram!("generation_request_duration_seconds", &labels)
        .record(params.duration.as_secs_f64());

    if let Some(tokens) = params.total_tokens {
        counter!("generation_tokens_total", &labels).increment(tokens);
    }
}

/// Record a replicate dropped from the aggregates
pub fn record_skipped_replicate(model: &str, reason: &str) {
    counter!(
        "replicates_skipped_total",
        "model" => model.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record a finished comparison report
pub fn record_comparison(metric: &str, undefined: bool, significant: bool) {
    let outcome = if undefined {
        "undefined"
    } else if significant {
        "significant"
    } else {
        "not_significant"
    };

    counter!(
        "comparisons_total",
        "metric" => metric.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

fn status_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_label() {
        assert_eq!(status_label(true), "success");
        assert_eq!(status_label(false), "error");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_generation_request(GenerationMetricParams {
            provider: "openrouter",
            model: "openai/gpt-4o-mini",
            duration: Duration::from_millis(500),
            success: true,
            total_tokens: Some(42),
        });
        record_skipped_replicate("openai/gpt-4o-mini", "generation");
        record_comparison("exact_match", false, true);
    }
}
