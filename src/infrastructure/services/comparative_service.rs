//! Cross-experiment summaries built from comparison reports

use std::collections::BTreeMap;

use crate::domain::experiment::{
    ActionImpact, ExperimentReport, ModelRobustness, PhaseTransition,
};
use crate::domain::metrics::MetricName;
use crate::infrastructure::experiment::{mean, std_dev};

/// |delta| above which an experiment counts as a phase transition
pub const DEFAULT_PHASE_THRESHOLD: f64 = 0.5;

/// Ranks actions and models by the delta of one metric across a run.
/// Comparisons without a delta (a condition had no observations) are ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparativeAnalysis {
    metric: MetricName,
    phase_threshold: f64,
}

impl Default for ComparativeAnalysis {
    fn default() -> Self {
        Self::new(MetricName::Memorization, DEFAULT_PHASE_THRESHOLD)
    }
}

struct Observation<'a> {
    report: &'a ExperimentReport,
    delta: f64,
    mean_control: f64,
    mean_modified: f64,
}

impl ComparativeAnalysis {
    pub fn new(metric: MetricName, phase_threshold: f64) -> Self {
        Self {
            metric,
            phase_threshold: phase_threshold.abs(),
        }
    }

    pub fn metric(&self) -> MetricName {
        self.metric
    }

    pub fn phase_threshold(&self) -> f64 {
        self.phase_threshold
    }

    fn observations<'a>(&self, reports: &'a [ExperimentReport]) -> Vec<Observation<'a>> {
        reports
            .iter()
            .filter_map(|report| {
                let comparison = report.comparison(self.metric)?;
                Some(Observation {
                    report,
                    delta: comparison.delta?,
                    mean_control: comparison.mean_control?,
                    mean_modified: comparison.mean_modified?,
                })
            })
            .collect()
    }

    /// Actions ordered by mean |delta|, largest first
    pub fn rank_by_impact(&self, reports: &[ExperimentReport]) -> Vec<ActionImpact> {
        let mut by_action: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for observation in self.observations(reports) {
            by_action
                .entry(observation.report.key.action_id.as_str())
                .or_default()
                .push(observation.delta.abs());
        }

        let mut ranking: Vec<ActionImpact> = by_action
            .into_iter()
            .map(|(action_id, impacts)| ActionImpact {
                action_id: action_id.to_string(),
                metric: self.metric,
                mean_impact: mean(&impacts),
                std_impact: std_dev(&impacts),
                max_impact: impacts.iter().copied().fold(0.0, f64::max),
                n_experiments: impacts.len(),
            })
            .collect();

        ranking.sort_by(|a, b| b.mean_impact.total_cmp(&a.mean_impact));
        ranking
    }

    /// Models ordered by robustness score, most robust first
    pub fn model_robustness(&self, reports: &[ExperimentReport]) -> Vec<ModelRobustness> {
        let mut by_model: BTreeMap<&str, Vec<Observation<'_>>> = BTreeMap::new();
        for observation in self.observations(reports) {
            by_model
                .entry(observation.report.key.model_id.as_str())
                .or_default()
                .push(observation);
        }

        let mut robustness: Vec<ModelRobustness> = by_model
            .into_iter()
            .map(|(model_id, observations)| {
                let deltas: Vec<f64> = observations.iter().map(|o| o.delta).collect();
                let controls: Vec<f64> = observations.iter().map(|o| o.mean_control).collect();
                let modified: Vec<f64> = observations.iter().map(|o| o.mean_modified).collect();
                let mean_delta = mean(&deltas);

                ModelRobustness {
                    model_id: model_id.to_string(),
                    metric: self.metric,
                    mean_delta,
                    std_delta: std_dev(&deltas),
                    min_delta: deltas.iter().copied().fold(f64::INFINITY, f64::min),
                    max_delta: deltas.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    mean_control: mean(&controls),
                    mean_modified: mean(&modified),
                    robustness_score: 1.0 - mean_delta.abs(),
                    n_experiments: deltas.len(),
                }
            })
            .collect();

        robustness.sort_by(|a, b| b.robustness_score.total_cmp(&a.robustness_score));
        robustness
    }

    /// Experiments whose |delta| exceeds the threshold, largest first
    pub fn phase_transitions(&self, reports: &[ExperimentReport]) -> Vec<PhaseTransition> {
        let mut transitions: Vec<PhaseTransition> = self
            .observations(reports)
            .into_iter()
            .filter(|o| o.delta.abs() > self.phase_threshold)
            .map(|o| PhaseTransition {
                key: o.report.key.clone(),
                metric: self.metric,
                delta: o.delta,
            })
            .collect();

        transitions.sort_by(|a, b| b.delta.abs().total_cmp(&a.delta.abs()));
        transitions
    }
}
