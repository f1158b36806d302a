//! Run-level views across experiments: which actions hit hardest, which
//! models hold up, and where the outcome flips

use serde::{Deserialize, Serialize};

use super::key::ExperimentKey;
use super::result::{AnovaResult, ExperimentReport};
use crate::domain::metrics::MetricName;

/// Whether the per-replicate effect of one action on one attractor differs
/// between models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEffect {
    pub attractor_id: String,
    pub action_id: String,
    pub metric: MetricName,
    /// Models in group order
    pub models: Vec<String>,
    /// ANOVA over per-replicate (modified - control) differences
    pub anova: AnovaResult,
    /// Bonferroni-adjusted over every model effect in the run
    pub p_value_corrected: f64,
    pub significant: bool,
}

/// Mean absolute delta of one action across attractors and models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionImpact {
    pub action_id: String,
    pub metric: MetricName,
    pub mean_impact: f64,
    pub std_impact: f64,
    pub max_impact: f64,
    pub n_experiments: usize,
}

/// How much of its control behaviour a model keeps under perturbation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRobustness {
    pub model_id: String,
    pub metric: MetricName,
    pub mean_delta: f64,
    pub std_delta: f64,
    pub min_delta: f64,
    pub max_delta: f64,
    pub mean_control: f64,
    pub mean_modified: f64,
    /// 1 - |mean_delta|; higher is more robust
    pub robustness_score: f64,
    pub n_experiments: usize,
}

/// An experiment whose delta exceeds the phase-transition threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub key: ExperimentKey,
    pub metric: MetricName,
    pub delta: f64,
}

/// Everything the analysis stage derives from a run's records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunAnalysis {
    pub reports: Vec<ExperimentReport>,
    #[serde(default)]
    pub model_effects: Vec<ModelEffect>,
    #[serde(default)]
    pub impact: Vec<ActionImpact>,
    #[serde(default)]
    pub robustness: Vec<ModelRobustness>,
    #[serde(default)]
    pub phase_transitions: Vec<PhaseTransition>,
}

impl RunAnalysis {
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn significant_comparisons(&self) -> usize {
        self.reports.iter().map(|r| r.significant().count()).sum()
    }

    pub fn total_comparisons(&self) -> usize {
        self.reports.iter().map(|r| r.comparisons.len()).sum()
    }
}
