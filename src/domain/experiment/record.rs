//! Metric records produced per replicate and condition

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::key::{Condition, ExperimentKey};
use crate::domain::metrics::{MetricName, MetricVector};

/// Unique identifier for a metric record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricRecordId(String);

impl MetricRecordId {
    /// Create a new metric record ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new unique ID
    pub fn generate() -> Self {
        Self(format!("metrec-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MetricRecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for MetricRecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a metric record came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricMetadata {
    /// Control or modified branch
    pub condition: Condition,
    pub attractor_id: String,
    pub action_id: String,
    pub model_id: String,
    /// Replicate index within the experiment, starting at 0
    pub replicate: u32,
    /// False when the action left the prompt and configuration untouched
    #[serde(default = "default_applied")]
    pub action_applied: bool,
}

fn default_applied() -> bool {
    true
}

/// Metric values observed for one replicate of one condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// Unique identifier for this record
    id: MetricRecordId,
    pub values: MetricVector,
    pub metadata: MetricMetadata,
    /// Generated text the values were computed from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// When the record was produced
    pub timestamp: DateTime<Utc>,
}

impl MetricResult {
    /// Create a new metric record
    pub fn new(
        id: impl Into<MetricRecordId>,
        key: &ExperimentKey,
        condition: Condition,
        replicate: u32,
        values: MetricVector,
    ) -> Self {
        Self {
            id: id.into(),
            values,
            metadata: MetricMetadata {
                condition,
                attractor_id: key.attractor_id.clone(),
                action_id: key.action_id.clone(),
                model_id: key.model_id.clone(),
                replicate,
                action_applied: true,
            },
            output: None,
            timestamp: Utc::now(),
        }
    }

    /// Record the generated text alongside the values
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Flag whether the action actually changed anything
    pub fn with_action_applied(mut self, applied: bool) -> Self {
        self.metadata.action_applied = applied;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn id(&self) -> &MetricRecordId {
        &self.id
    }

    pub fn condition(&self) -> Condition {
        self.metadata.condition
    }

    pub fn key(&self) -> ExperimentKey {
        ExperimentKey::new(
            &self.metadata.attractor_id,
            &self.metadata.action_id,
            &self.metadata.model_id,
        )
    }

    pub fn value(&self, metric: MetricName) -> Option<f64> {
        self.values.get(metric)
    }
}

/// Group records by experiment, keeping execution order inside each group
pub fn group_by_experiment(
    records: &[MetricResult],
) -> BTreeMap<ExperimentKey, Vec<MetricResult>> {
    let mut groups: BTreeMap<ExperimentKey, Vec<MetricResult>> = BTreeMap::new();
    for record in records {
        groups.entry(record.key()).or_default().push(record.clone());
    }
    groups
}

/// Values of `metric` for one condition, in execution order. Records that
/// lack the metric contribute nothing.
pub fn condition_values(
    records: &[MetricResult],
    condition: Condition,
    metric: MetricName,
) -> Vec<f64> {
    records
        .iter()
        .filter(|record| record.condition() == condition)
        .filter_map(|record| record.value(metric))
        .collect()
}

/// Generated texts of one condition, in execution order
pub fn condition_outputs(records: &[MetricResult], condition: Condition) -> Vec<&str> {
    records
        .iter()
        .filter(|record| record.condition() == condition)
        .filter_map(|record| record.output.as_deref())
        .collect()
}

/// Per-replicate `modified - control` for one experiment's records, in
/// replicate order. Replicates missing either side are left out.
pub fn paired_differences(records: &[MetricResult], metric: MetricName) -> Vec<f64> {
    let mut pairs: BTreeMap<u32, (Option<f64>, Option<f64>)> = BTreeMap::new();
    for record in records {
        let Some(value) = record.value(metric) else {
            continue;
        };
        let slot = pairs.entry(record.metadata.replicate).or_default();
        match record.condition() {
            Condition::Control => slot.0 = Some(value),
            Condition::Modified => slot.1 = Some(value),
        }
    }

    pairs
        .into_values()
        .filter_map(|(control, modified)| Some(modified? - control?))
        .collect()
}

/// Metric names present in any record of the group
pub fn metrics_present(records: &[MetricResult]) -> Vec<MetricName> {
    let mut names: Vec<MetricName> = records.iter().flat_map(|r| r.values.names()).collect();
    names.sort();
    names.dedup();
    names
}
