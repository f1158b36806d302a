//! Turns per-replicate metric records into corrected comparison reports
//! and the run-level views built on top of them

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::domain::experiment::{
    condition_outputs, condition_values, group_by_experiment, metrics_present,
    paired_differences, Condition, ExperimentReport, MetricResult, ModelEffect, RunAnalysis,
};
use crate::domain::metrics::replicate_stability;
use crate::domain::DomainError;
use crate::infrastructure::experiment::{one_way_anova, Bonferroni, RunArtifact, StatisticalEngine};
use crate::infrastructure::observability::record_comparison;

use super::comparative_service::ComparativeAnalysis;

/// Compares control and modified records of every experiment in a run
#[derive(Debug, Clone, Default)]
pub struct AnalysisService {
    engine: StatisticalEngine,
    comparative: ComparativeAnalysis,
}

impl AnalysisService {
    pub fn new(engine: StatisticalEngine) -> Self {
        Self {
            engine,
            comparative: ComparativeAnalysis::default(),
        }
    }

    pub fn with_comparative(mut self, comparative: ComparativeAnalysis) -> Self {
        self.comparative = comparative;
        self
    }

    pub fn engine(&self) -> &StatisticalEngine {
        &self.engine
    }

    /// Number of (experiment, metric) comparisons the records support.
    /// This is the Bonferroni family size.
    pub fn family_size(records: &[MetricResult]) -> usize {
        group_by_experiment(records)
            .values()
            .map(|group| metrics_present(group).len())
            .sum()
    }

    /// One report per experiment, ordered by experiment key
    pub fn analyze(&self, records: &[MetricResult]) -> Result<Vec<ExperimentReport>, DomainError> {
        let family_size = Self::family_size(records);
        if family_size == 0 {
            return Ok(Vec::new());
        }

        let groups = group_by_experiment(records);
        info!(
            experiments = groups.len(),
            family_size,
            corrected_alpha = self.engine.alpha() / family_size as f64,
            "Analyzing run"
        );

        let mut reports = Vec::with_capacity(groups.len());

        for (key, group) in groups {
            let mut comparisons = Vec::new();

            for metric in metrics_present(&group) {
                let control = condition_values(&group, Condition::Control, metric);
                let modified = condition_values(&group, Condition::Modified, metric);

                let report = self
                    .engine
                    .compare(metric, &control, &modified, family_size)?;
                record_comparison(metric.as_str(), report.undefined, report.significant);
                comparisons.push(report);
            }

            let noop_replicates = group
                .iter()
                .filter(|r| r.condition() == Condition::Modified && !r.metadata.action_applied)
                .count();

            debug!(
                experiment = %key,
                comparisons = comparisons.len(),
                significant = comparisons.iter().filter(|c| c.significant).count(),
                noop_replicates,
                "Experiment analyzed"
            );

            let mut report = ExperimentReport::new(key, comparisons);
            report.noop_replicates = noop_replicates;
            reports.push(report);
        }

        Ok(reports)
    }

    /// Full analysis of a saved run: per-experiment reports with replicate
    /// stability, the model-effect ANOVAs and the comparative summaries
    pub fn analyze_run(&self, artifact: &RunArtifact) -> Result<RunAnalysis, DomainError> {
        let mut reports = self.analyze(&artifact.records)?;

        let groups = group_by_experiment(&artifact.records);
        for report in &mut reports {
            let (Some(group), Some(reference)) = (
                groups.get(&report.key),
                artifact.references.get(&report.key.attractor_id),
            ) else {
                continue;
            };
            report.control_stability = stability(group, Condition::Control, reference);
            report.modified_stability = stability(group, Condition::Modified, reference);
        }

        let model_effects = self.model_effects(&artifact.records)?;

        Ok(RunAnalysis {
            impact: self.comparative.rank_by_impact(&reports),
            robustness: self.comparative.model_robustness(&reports),
            phase_transitions: self.comparative.phase_transitions(&reports),
            model_effects,
            reports,
        })
    }

    /// Per (attractor, action, metric): one-way ANOVA of the per-replicate
    /// differences across models. Only cells with at least two models that
    /// have paired replicates are tested; p-values are Bonferroni-corrected
    /// over every tested cell.
    pub fn model_effects(&self, records: &[MetricResult]) -> Result<Vec<ModelEffect>, DomainError> {
        let mut cells: BTreeMap<(String, String), BTreeMap<String, Vec<MetricResult>>> =
            BTreeMap::new();
        for (key, group) in group_by_experiment(records) {
            cells
                .entry((key.attractor_id, key.action_id))
                .or_default()
                .insert(key.model_id, group);
        }

        let mut tested = Vec::new();
        for ((attractor_id, action_id), by_model) in cells {
            if by_model.len() < 2 {
                continue;
            }
            let all: Vec<MetricResult> = by_model.values().flatten().cloned().collect();

            for metric in metrics_present(&all) {
                let (models, differences): (Vec<String>, Vec<Vec<f64>>) = by_model
                    .iter()
                    .map(|(model, group)| (model.clone(), paired_differences(group, metric)))
                    .filter(|(_, diffs)| !diffs.is_empty())
                    .unzip();

                let groups: Vec<&[f64]> = differences.iter().map(Vec::as_slice).collect();
                let Some(anova) = one_way_anova(&groups, self.engine.alpha()) else {
                    continue;
                };

                tested.push(ModelEffect {
                    attractor_id: attractor_id.clone(),
                    action_id: action_id.clone(),
                    metric,
                    models,
                    p_value_corrected: anova.p_value,
                    significant: anova.significant,
                    anova,
                });
            }
        }

        if tested.is_empty() {
            return Ok(tested);
        }

        let correction = Bonferroni::new(self.engine.alpha(), tested.len())?;
        let p_values: Vec<f64> = tested.iter().map(|e| e.anova.p_value).collect();
        for (effect, corrected) in tested.iter_mut().zip(correction.correct_all(&p_values)) {
            effect.p_value_corrected = corrected.corrected;
            effect.significant = corrected.significant;
        }

        info!(
            tested = tested.len(),
            significant = tested.iter().filter(|e| e.significant).count(),
            "Model effects analyzed"
        );

        Ok(tested)
    }
}

fn stability(group: &[MetricResult], condition: Condition, reference: &str) -> Option<f64> {
    let outputs = condition_outputs(group, condition);
    (!outputs.is_empty()).then(|| replicate_stability(&outputs, reference))
}
