//! Experiment domain: identities, per-replicate metric records and
//! statistical comparison results

mod comparative;
mod key;
mod record;
mod result;

pub use comparative::{ActionImpact, ModelEffect, ModelRobustness, PhaseTransition, RunAnalysis};
pub use key::{Condition, ExperimentKey};
pub use record::{
    condition_outputs, condition_values, group_by_experiment, metrics_present,
    paired_differences, MetricMetadata, MetricRecordId, MetricResult,
};
pub use result::{
    AnovaResult, ComparisonReport, ConfidenceInterval, EffectMagnitude, ExperimentReport,
    TTestResult, TARGET_POWER,
};
