//! Analyze command - recomputes statistical reports and comparative views
//! for a saved run

use std::path::PathBuf;

use anyhow::anyhow;
use clap::Args;
use tracing::info;

use super::analysis_service;
use crate::config::AppConfig;
use crate::domain::experiment::{ExperimentReport, RunAnalysis};
use crate::infrastructure::experiment::ResultStore;

/// Arguments for the analyze command
#[derive(Args, Clone, Debug)]
pub struct AnalyzeArgs {
    /// Run artifact to analyze (defaults to the latest in the results directory)
    pub path: Option<PathBuf>,

    /// Significance level before correction (overrides config)
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Print the analysis as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the recomputed analysis back into the artifact
    #[arg(long)]
    pub update: bool,
}

/// Load a run artifact, recompute its analysis and print it
pub async fn run(config: AppConfig, args: AnalyzeArgs) -> anyhow::Result<()> {
    let store = ResultStore::new(&config.experiment.results_dir);

    let path = match args.path {
        Some(path) => path,
        None => store.latest().await?.ok_or_else(|| {
            anyhow!(
                "No runs found in {}; pass a path or run experiments first",
                store.dir().display()
            )
        })?,
    };

    let mut artifact = store.load(&path).await?;
    info!(
        path = %path.display(),
        run_id = %artifact.run_id,
        records = artifact.records.len(),
        "Loaded run"
    );

    let analysis = analysis_service(&config.experiment, args.alpha)?.analyze_run(&artifact)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        println!(
            "Run {} ({} provider, {} records, {} skipped replicates)\n",
            artifact.run_id,
            artifact.provider,
            artifact.records.len(),
            artifact.skipped_replicates
        );
        print_analysis(&analysis);
    }

    if args.update {
        artifact.analysis = analysis;
        let json = serde_json::to_string_pretty(&artifact)?;
        tokio::fs::write(&path, json).await?;
        info!(path = %path.display(), "Run analysis updated");
    }

    Ok(())
}

/// Reports followed by the run-level views
pub fn print_analysis(analysis: &RunAnalysis) {
    print_reports(&analysis.reports);

    if !analysis.model_effects.is_empty() {
        println!("\nModel effects (ANOVA of per-replicate differences across models):");
        for effect in &analysis.model_effects {
            let marker = if effect.significant { "*" } else { " " };
            println!(
                "  {} {} / {} {}: F={:.3}, p={:.4} (corrected {:.4}), eta^2={:.3} over {}",
                marker,
                effect.attractor_id,
                effect.action_id,
                effect.metric,
                effect.anova.f_statistic,
                effect.anova.p_value,
                effect.p_value_corrected,
                effect.anova.eta_squared,
                effect.models.join(", ")
            );
        }
    }

    if !analysis.impact.is_empty() {
        println!("\nActions by impact:");
        for (rank, impact) in analysis.impact.iter().enumerate() {
            println!(
                "  {}. {}: mean |delta| {:.4} (sd {:.4}, max {:.4}, {} experiment(s))",
                rank + 1,
                impact.action_id,
                impact.mean_impact,
                impact.std_impact,
                impact.max_impact,
                impact.n_experiments
            );
        }
    }

    if !analysis.robustness.is_empty() {
        println!("\nModels by robustness:");
        for (rank, model) in analysis.robustness.iter().enumerate() {
            println!(
                "  {}. {}: score {:.4}, mean delta {:+.4} [{:+.4}, {:+.4}], control {:.4} -> modified {:.4}",
                rank + 1,
                model.model_id,
                model.robustness_score,
                model.mean_delta,
                model.min_delta,
                model.max_delta,
                model.mean_control,
                model.mean_modified
            );
        }
    }

    if !analysis.phase_transitions.is_empty() {
        println!("\nPhase transitions:");
        for transition in &analysis.phase_transitions {
            println!(
                "  {} {}: delta {:+.4}",
                transition.key, transition.metric, transition.delta
            );
        }
    }
}

/// Human-readable summary, one block per experiment
pub fn print_reports(reports: &[ExperimentReport]) {
    if reports.is_empty() {
        println!("No comparisons to report");
        return;
    }

    for report in reports {
        println!("{}", report.key);
        if let (Some(control), Some(modified)) =
            (report.control_stability, report.modified_stability)
        {
            println!(
                "  replicate stability: control {:.3}, modified {:.3}",
                control, modified
            );
        }
        if report.noop_replicates > 0 {
            println!(
                "  note: action was a no-op in {} replicate(s); differences reflect sampling noise only",
                report.noop_replicates
            );
        }
        for comparison in &report.comparisons {
            let marker = if comparison.significant { "*" } else { " " };
            println!("  {} {}", marker, comparison.interpretation());
        }
        println!();
    }

    let significant: usize = reports.iter().map(|r| r.significant().count()).sum();
    let total: usize = reports.iter().map(|r| r.comparisons.len()).sum();
    println!(
        "{} of {} comparisons significant after Bonferroni correction",
        significant, total
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::experiment::{Condition, ExperimentKey, MetricRecordId};
    use crate::domain::metrics::{MetricName, MetricVector};
    use crate::domain::{MetricResult, SamplingConfig};
    use crate::infrastructure::experiment::RunArtifact;

    fn artifact() -> RunArtifact {
        let key = ExperimentKey::new("quijote_base", "logit_tail_bias:0.80", "m");
        let mut artifact = RunArtifact::new("mock", SamplingConfig::default(), 3);
        for (condition, values) in [
            (Condition::Control, [0.9, 0.95, 1.0]),
            (Condition::Modified, [0.2, 0.3, 0.25]),
        ] {
            for (i, value) in values.into_iter().enumerate() {
                artifact.records.push(MetricResult::new(
                    MetricRecordId::generate(),
                    &key,
                    condition,
                    i as u32,
                    MetricVector::new().with(MetricName::Memorization, value),
                ));
            }
        }
        artifact
    }

    #[tokio::test]
    async fn test_analyze_latest_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.experiment.results_dir = dir.path().to_string_lossy().to_string();
        ResultStore::new(dir.path()).save(&artifact()).await.unwrap();

        let args = AnalyzeArgs {
            path: None,
            alpha: None,
            json: true,
            update: false,
        };

        run(config, args).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_writes_analysis_into_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.experiment.results_dir = dir.path().to_string_lossy().to_string();
        let store = ResultStore::new(dir.path());
        let path = store.save(&artifact()).await.unwrap();

        let args = AnalyzeArgs {
            path: Some(path.clone()),
            alpha: None,
            json: false,
            update: true,
        };
        run(config, args).await.unwrap();

        let updated = store.load(&path).await.unwrap();
        assert_eq!(updated.analysis.reports.len(), 1);
        let memorization = updated.analysis.reports[0]
            .comparison(MetricName::Memorization)
            .unwrap();
        assert!(memorization.significant);
        assert_eq!(updated.analysis.impact[0].action_id, "logit_tail_bias:0.80");
        assert_eq!(updated.analysis.phase_transitions.len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_without_runs_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.experiment.results_dir = dir.path().to_string_lossy().to_string();

        let args = AnalyzeArgs {
            path: None,
            alpha: None,
            json: false,
            update: false,
        };

        assert!(run(config, args).await.is_err());
    }
}
