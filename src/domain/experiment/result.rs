//! Statistical result types for control vs modified comparisons

use serde::{Deserialize, Serialize};
use std::fmt;

use super::key::ExperimentKey;
use crate::domain::metrics::MetricName;

// ============================================================================
// ConfidenceInterval
// ============================================================================

/// Two-sided confidence interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    /// Confidence level, e.g. 0.95
    pub level: f64,
}

impl ConfidenceInterval {
    pub fn new(lower: f64, upper: f64, level: f64) -> Self {
        Self {
            lower,
            upper,
            level,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

// ============================================================================
// EffectMagnitude
// ============================================================================

/// Conventional reading of |Cohen's d|
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectMagnitude {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectMagnitude {
    /// Thresholds at 0.2, 0.5 and 0.8
    pub fn from_cohens_d(d: f64) -> Self {
        let d = d.abs();
        if d < 0.2 {
            Self::Negligible
        } else if d < 0.5 {
            Self::Small
        } else if d < 0.8 {
            Self::Medium
        } else {
            Self::Large
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negligible => "negligible",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for EffectMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// TTestResult
// ============================================================================

/// Outcome of a two-sample t-test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TTestResult {
    /// t statistic for mean(modified) - mean(control)
    pub t_statistic: f64,
    pub degrees_of_freedom: f64,
    /// Two-tailed p-value
    pub p_value: f64,
    /// None when the pooled standard deviation is zero
    pub cohens_d: Option<f64>,
    /// Bootstrap CI of mean(modified) - mean(control)
    pub ci_95: ConfidenceInterval,
    /// p_value < alpha, uncorrected
    pub significant: bool,
}

// ============================================================================
// AnovaResult
// ============================================================================

/// One-way ANOVA across several groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnovaResult {
    pub f_statistic: f64,
    pub p_value: f64,
    pub df_between: f64,
    pub df_within: f64,
    /// Share of total variance explained by group membership
    pub eta_squared: f64,
    pub significant: bool,
}

// ============================================================================
// ComparisonReport
// ============================================================================

/// Power the required-sample-size hint is computed for
pub const TARGET_POWER: f64 = 0.8;

/// Comparison of one metric between control and modified samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub metric: MetricName,
    pub n_control: usize,
    pub n_modified: usize,
    /// None when the condition has no observations of the metric
    pub mean_control: Option<f64>,
    pub mean_modified: Option<f64>,
    /// mean_modified - mean_control, when both exist
    pub delta: Option<f64>,
    /// t-based interval of each condition mean, from two observations up
    #[serde(default)]
    pub control_ci: Option<ConfidenceInterval>,
    #[serde(default)]
    pub modified_ci: Option<ConfidenceInterval>,
    /// Bootstrap interval of the delta
    pub ci_low: Option<f64>,
    pub ci_high: Option<f64>,
    pub t_statistic: Option<f64>,
    pub p_value: Option<f64>,
    /// Bonferroni-adjusted p-value, min(p * family_size, 1)
    pub p_value_corrected: Option<f64>,
    pub cohens_d: Option<f64>,
    pub effect: Option<EffectMagnitude>,
    /// Replicates per condition needed to detect the observed effect at the
    /// corrected alpha; set only when the comparison is not significant
    #[serde(default)]
    pub required_n: Option<usize>,
    /// Raw p-value below alpha
    pub significant_uncorrected: bool,
    /// Raw p-value below alpha / family_size
    pub significant: bool,
    /// True when either condition has fewer than two observations
    pub undefined: bool,
    pub alpha: f64,
    pub family_size: usize,
}

impl ComparisonReport {
    /// Report with sample sizes only: no means, no test, never significant
    pub fn undefined(
        metric: MetricName,
        n_control: usize,
        n_modified: usize,
        alpha: f64,
        family_size: usize,
    ) -> Self {
        Self {
            metric,
            n_control,
            n_modified,
            mean_control: None,
            mean_modified: None,
            delta: None,
            control_ci: None,
            modified_ci: None,
            ci_low: None,
            ci_high: None,
            t_statistic: None,
            p_value: None,
            p_value_corrected: None,
            cohens_d: None,
            effect: None,
            required_n: None,
            significant_uncorrected: false,
            significant: false,
            undefined: true,
            alpha,
            family_size,
        }
    }

    /// Set both condition means; the delta follows when both exist
    pub fn with_means(mut self, control: Option<f64>, modified: Option<f64>) -> Self {
        self.mean_control = control;
        self.mean_modified = modified;
        self.delta = control.zip(modified).map(|(c, m)| m - c);
        self
    }

    /// One-line human readable summary
    pub fn interpretation(&self) -> String {
        if self.undefined {
            return format!(
                "{}: test undefined (n_control={}, n_modified={}; need at least 2 each)",
                self.metric, self.n_control, self.n_modified
            );
        }

        let verdict = if self.significant {
            "significant after correction"
        } else if self.significant_uncorrected {
            "significant before correction only"
        } else {
            "not significant"
        };
        let effect = self
            .effect
            .map(|e| format!("{} effect", e))
            .unwrap_or_else(|| "undefined effect size".to_string());
        let delta = self
            .delta
            .map(|d| format!("{:+.4}", d))
            .unwrap_or_else(|| "n/a".to_string());

        let mut line = format!("{}: delta {} ({}), {}", self.metric, delta, effect, verdict);
        if let Some(n) = self.required_n {
            line.push_str(&format!(
                "; ~{} replicates per condition for {:.0}% power",
                n,
                TARGET_POWER * 100.0
            ));
        }
        line
    }
}

// ============================================================================
// ExperimentReport
// ============================================================================

/// All metric comparisons for one experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub key: ExperimentKey,
    pub comparisons: Vec<ComparisonReport>,
    /// Replicates whose modified action was a no-op
    #[serde(default)]
    pub noop_replicates: usize,
    /// Replicate stability of each condition's outputs against the
    /// attractor continuation; None without outputs or a reference
    #[serde(default)]
    pub control_stability: Option<f64>,
    #[serde(default)]
    pub modified_stability: Option<f64>,
}

impl ExperimentReport {
    pub fn new(key: ExperimentKey, comparisons: Vec<ComparisonReport>) -> Self {
        Self {
            key,
            comparisons,
            noop_replicates: 0,
            control_stability: None,
            modified_stability: None,
        }
    }

    pub fn comparison(&self, metric: MetricName) -> Option<&ComparisonReport> {
        self.comparisons.iter().find(|c| c.metric == metric)
    }

    pub fn significant(&self) -> impl Iterator<Item = &ComparisonReport> {
        self.comparisons.iter().filter(|c| c.significant)
    }
}
