//! Attractor validation
//!
//! Checks which attractors a model actually reproduces before they are used
//! in experiments. Each attractor prompt is sent once per model at
//! temperature 0; the prompt followed by the completion is scored against
//! the canonical passage.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::generation::lexical_token_ids;
use crate::domain::metrics::{exact_match, prefix_match_words, token_overlap};
use crate::domain::{Attractor, DomainError, GenerationProvider, SamplingConfig};
use crate::infrastructure::experiment::mean;
use crate::infrastructure::observability::{record_generation_request, GenerationMetricParams};

const VALIDATION_PREFIX: &str = "validation_";

/// Result of one attractor on one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub attractor_id: String,
    pub model: String,
    pub memorization: f64,
    pub exact_match: f64,
    pub token_overlap: f64,
    /// Leading words of the canonical passage reproduced verbatim
    pub prefix_words: usize,
    pub is_memorized: bool,
    pub expected: f64,
    /// memorization - expected
    pub delta_from_expected: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Set when generation failed; all scores are then 0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationOutcome {
    fn failed(attractor: &Attractor, model: &str, error: &DomainError) -> Self {
        Self {
            attractor_id: attractor.id.clone(),
            model: model.to_string(),
            memorization: 0.0,
            exact_match: 0.0,
            token_overlap: 0.0,
            prefix_words: 0,
            is_memorized: false,
            expected: attractor.expected_memorization,
            delta_from_expected: -attractor.expected_memorization,
            response: None,
            error: Some(error.to_string()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-model totals; failed generations count as unmemorized with score 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model: String,
    pub memorized: usize,
    pub total: usize,
    pub failed: usize,
    pub mean_memorization: f64,
}

impl ModelSummary {
    pub fn memorized_share(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.memorized as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractorRanking {
    pub attractor_id: String,
    pub source: String,
    pub mean_memorization: f64,
}

/// Everything one validation pass produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub timestamp: DateTime<Utc>,
    pub provider: String,
    pub threshold: f64,
    pub models: Vec<String>,
    pub outcomes: Vec<ValidationOutcome>,
    pub summaries: Vec<ModelSummary>,
    /// Attractors by mean memorization across models, best first
    pub ranking: Vec<AttractorRanking>,
}

impl ValidationReport {
    pub fn file_name(&self) -> String {
        format!(
            "{}{}.json",
            VALIDATION_PREFIX,
            self.timestamp.format("%Y%m%d_%H%M%S")
        )
    }

    pub fn outcome(&self, attractor_id: &str, model: &str) -> Option<&ValidationOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.attractor_id == attractor_id && o.model == model)
    }
}

/// Queries each model with each attractor prompt and scores the reproduction
#[derive(Debug, Clone)]
pub struct AttractorValidationService {
    provider: Arc<dyn GenerationProvider>,
    threshold: f64,
}

impl AttractorValidationService {
    pub fn new(provider: Arc<dyn GenerationProvider>, threshold: f64) -> Result<Self, DomainError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(DomainError::configuration(format!(
                "memorization threshold must be in [0, 1], got {}",
                threshold
            )));
        }
        Ok(Self { provider, threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Greedy decoding with room for twice the passage length
    pub fn sampling_for(attractor: &Attractor) -> SamplingConfig {
        let max_tokens = u32::try_from(attractor.word_count() * 2)
            .unwrap_or(u32::MAX)
            .max(1);
        SamplingConfig::new(0.0, max_tokens)
    }

    /// Validate every attractor on every model. Generation failures are
    /// recorded per outcome; only empty inputs are an error.
    pub async fn validate(
        &self,
        attractors: &[Attractor],
        models: &[String],
    ) -> Result<ValidationReport, DomainError> {
        if attractors.is_empty() {
            return Err(DomainError::configuration("no attractors selected"));
        }
        if models.is_empty() {
            return Err(DomainError::configuration("no models selected"));
        }

        info!(
            provider = self.provider.provider_name(),
            attractors = attractors.len(),
            models = models.len(),
            threshold = self.threshold,
            "Validating attractors"
        );

        let mut outcomes = Vec::with_capacity(attractors.len() * models.len());
        for attractor in attractors {
            for model in models {
                outcomes.push(self.validate_one(attractor, model).await);
            }
        }

        let report = ValidationReport {
            timestamp: Utc::now(),
            provider: self.provider.provider_name().to_string(),
            threshold: self.threshold,
            models: models.to_vec(),
            summaries: summarize(models, &outcomes),
            ranking: rank(attractors, &outcomes),
            outcomes,
        };

        info!(
            memorized = report.outcomes.iter().filter(|o| o.is_memorized).count(),
            failed = report.outcomes.iter().filter(|o| !o.succeeded()).count(),
            "Validation finished"
        );

        Ok(report)
    }

    async fn validate_one(&self, attractor: &Attractor, model: &str) -> ValidationOutcome {
        let sampling = Self::sampling_for(attractor);
        let start = Instant::now();
        let result = self
            .provider
            .generate(model, &attractor.prompt, &sampling)
            .await;

        record_generation_request(GenerationMetricParams {
            provider: self.provider.provider_name(),
            model,
            duration: start.elapsed(),
            success: result.is_ok(),
            total_tokens: result.as_ref().ok().map(|s| u64::from(s.total_tokens)),
        });

        let sample = match result {
            Ok(sample) => sample,
            Err(err) => {
                warn!(attractor = %attractor.id, model, error = %err, "Validation generation failed");
                return ValidationOutcome::failed(attractor, model, &err);
            }
        };

        let reproduced = format!("{} {}", attractor.prompt.trim_end(), sample.text.trim());
        let (memorization, is_memorized) =
            attractor.check_memorization(&reproduced, self.threshold);

        if memorization < 0.5 {
            warn!(attractor = %attractor.id, model, memorization, "Low memorization");
        }

        ValidationOutcome {
            attractor_id: attractor.id.clone(),
            model: model.to_string(),
            memorization,
            exact_match: exact_match(&reproduced, &attractor.canonical),
            token_overlap: token_overlap(
                &lexical_token_ids(&reproduced),
                &lexical_token_ids(&attractor.canonical),
            ),
            prefix_words: prefix_match_words(&reproduced, &attractor.canonical),
            is_memorized,
            expected: attractor.expected_memorization,
            delta_from_expected: memorization - attractor.expected_memorization,
            response: Some(sample.text),
            error: None,
        }
    }
}

fn summarize(models: &[String], outcomes: &[ValidationOutcome]) -> Vec<ModelSummary> {
    models
        .iter()
        .map(|model| {
            let own: Vec<&ValidationOutcome> =
                outcomes.iter().filter(|o| &o.model == model).collect();
            let scores: Vec<f64> = own.iter().map(|o| o.memorization).collect();
            ModelSummary {
                model: model.clone(),
                memorized: own.iter().filter(|o| o.is_memorized).count(),
                total: own.len(),
                failed: own.iter().filter(|o| !o.succeeded()).count(),
                mean_memorization: mean(&scores),
            }
        })
        .collect()
}

fn rank(attractors: &[Attractor], outcomes: &[ValidationOutcome]) -> Vec<AttractorRanking> {
    let mut scores: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for outcome in outcomes {
        scores
            .entry(outcome.attractor_id.as_str())
            .or_default()
            .push(outcome.memorization);
    }

    let mut ranking: Vec<AttractorRanking> = attractors
        .iter()
        .map(|attractor| AttractorRanking {
            attractor_id: attractor.id.clone(),
            source: attractor.source.clone(),
            mean_memorization: scores
                .get(attractor.id.as_str())
                .map(|s| mean(s))
                .unwrap_or(0.0),
        })
        .collect();

    ranking.sort_by(|a, b| b.mean_memorization.total_cmp(&a.mean_memorization));
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::generation::MockGenerationProvider;

    const PROMPT: &str = "It is a truth universally acknowledged,";
    const CONTINUATION: &str =
        "that a single man in possession of a good fortune, must be in want of a wife.";

    fn austen() -> Attractor {
        Attractor::new("austen", PROMPT, format!("{} {}", PROMPT, CONTINUATION))
            .with_source("Jane Austen")
            .with_expected_memorization(0.95)
    }

    fn melville() -> Attractor {
        Attractor::new(
            "melville",
            "Call me Ishmael.",
            "Call me Ishmael. Some years ago, never mind how long precisely",
        )
        .with_expected_memorization(0.9)
    }

    fn models(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn service(provider: MockGenerationProvider) -> (AttractorValidationService, Arc<MockGenerationProvider>) {
        let provider = Arc::new(provider);
        let service = AttractorValidationService::new(provider.clone(), 0.8).unwrap();
        (service, provider)
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let provider = Arc::new(MockGenerationProvider::new(""));
        let err = AttractorValidationService::new(provider, 1.5).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_sampling_is_greedy_and_sized_to_passage() {
        let sampling = AttractorValidationService::sampling_for(&austen());
        assert_eq!(sampling.temperature, 0.0);
        assert_eq!(sampling.max_tokens, 46);
    }

    #[tokio::test]
    async fn test_faithful_reproduction_is_memorized() {
        let (service, provider) = service(MockGenerationProvider::new(CONTINUATION));

        let report = service.validate(&[austen()], &models(&["m"])).await.unwrap();

        let outcome = report.outcome("austen", "m").unwrap();
        assert_eq!(outcome.memorization, 1.0);
        assert_eq!(outcome.exact_match, 1.0);
        assert_eq!(outcome.prefix_words, 23);
        assert!(outcome.is_memorized);
        assert!((outcome.delta_from_expected - 0.05).abs() < 1e-9);
        assert_eq!(outcome.response.as_deref(), Some(CONTINUATION));

        let calls = provider.calls();
        assert_eq!(calls[0].1, PROMPT);
        assert_eq!(calls[0].2.temperature, 0.0);
    }

    #[tokio::test]
    async fn test_summary_and_ranking() {
        let provider = MockGenerationProvider::new(CONTINUATION)
            .with_rule("Ishmael", "It was a dark and stormy night");
        let (service, _) = service(provider);

        let report = service
            .validate(&[melville(), austen()], &models(&["a", "b"]))
            .await
            .unwrap();

        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.summaries.len(), 2);
        let summary = &report.summaries[0];
        assert_eq!(summary.model, "a");
        assert_eq!(summary.memorized, 1);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.memorized_share(), 0.5);

        assert_eq!(report.ranking[0].attractor_id, "austen");
        assert_eq!(report.ranking[0].source, "Jane Austen");
        assert_eq!(report.ranking[1].attractor_id, "melville");
        assert!(report.ranking[1].mean_memorization < 0.8);
    }

    #[tokio::test]
    async fn test_generation_failure_is_recorded_not_fatal() {
        let (service, _) = service(MockGenerationProvider::new(CONTINUATION).failing_on_call(1));

        let report = service
            .validate(&[austen()], &models(&["a", "b"]))
            .await
            .unwrap();

        let failed = report.outcome("austen", "b").unwrap();
        assert!(!failed.succeeded());
        assert!(!failed.is_memorized);
        assert_eq!(failed.memorization, 0.0);
        assert!((failed.delta_from_expected + 0.95).abs() < 1e-9);
        assert!(failed.error.as_deref().unwrap().contains("scripted failure"));

        assert_eq!(report.summaries[1].failed, 1);
        assert_eq!(report.summaries[1].mean_memorization, 0.0);
        assert!(report.outcome("austen", "a").unwrap().succeeded());
    }

    #[tokio::test]
    async fn test_empty_inputs_rejected() {
        let (service, provider) = service(MockGenerationProvider::new(CONTINUATION));

        assert!(service.validate(&[], &models(&["a"])).await.is_err());
        assert!(service.validate(&[austen()], &[]).await.is_err());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_report_file_name() {
        let (service, _) = service(MockGenerationProvider::new(CONTINUATION));
        let report = service.validate(&[austen()], &models(&["a"])).await.unwrap();

        let name = report.file_name();
        assert!(name.starts_with("validation_"));
        assert!(name.ends_with(".json"));
    }
}
