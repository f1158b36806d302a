//! Validate command - checks which attractors each model reproduces

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tracing::info;

use super::generation_provider;
use super::run::select_attractors;
use crate::config::AppConfig;
use crate::domain::attractor::SuiteSize;
use crate::domain::GenerationProvider;
use crate::infrastructure::experiment::ResultStore;
use crate::infrastructure::services::{AttractorValidationService, ValidationReport};

/// Outcomes below this score get their response printed
const LOW_MEMORIZATION: f64 = 0.5;

/// Arguments for the validate command
#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    /// Attractor ids, comma separated (overrides --suite)
    #[arg(long, value_delimiter = ',')]
    pub attractors: Vec<String>,

    /// Preset attractor suite: minimal, standard or comprehensive
    #[arg(long, default_value = "minimal")]
    pub suite: SuiteSize,

    /// Models to query, comma separated (overrides config)
    #[arg(long, value_delimiter = ',')]
    pub models: Vec<String>,

    /// Memorization score counted as reproduced (overrides config)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Print results without writing the validation report
    #[arg(long)]
    pub no_save: bool,
}

pub async fn run(config: AppConfig, args: ValidateArgs) -> anyhow::Result<()> {
    let provider = generation_provider(&config.generation)?;
    execute(&config, &args, provider).await.map(|_| ())
}

/// Validate with an already built provider; returns where the report was
/// saved, if it was
pub async fn execute(
    config: &AppConfig,
    args: &ValidateArgs,
    provider: Arc<dyn GenerationProvider>,
) -> anyhow::Result<Option<PathBuf>> {
    let attractors = select_attractors(&args.attractors, args.suite)?;
    let models = if args.models.is_empty() {
        config.experiment.models.clone()
    } else {
        args.models.clone()
    };
    let threshold = args
        .threshold
        .unwrap_or(config.experiment.memorization_threshold);

    let service = AttractorValidationService::new(provider, threshold)?;
    let report = service.validate(&attractors, &models).await?;

    print_validation(&report);

    if args.no_save {
        return Ok(None);
    }

    let store = ResultStore::new(&config.experiment.results_dir);
    let path = store.write_json(&report.file_name(), &report).await?;
    info!(path = %path.display(), "Validation saved");
    println!("\nSaved validation to {}", path.display());
    Ok(Some(path))
}

pub fn print_validation(report: &ValidationReport) {
    println!(
        "Validated {} attractor(s) on {} model(s), threshold {:.2}\n",
        report.ranking.len(),
        report.models.len(),
        report.threshold
    );

    for outcome in &report.outcomes {
        match &outcome.error {
            Some(error) => println!("  x {} on {}: {}", outcome.attractor_id, outcome.model, error),
            None => {
                let marker = if outcome.is_memorized { "+" } else { "-" };
                println!(
                    "  {} {} on {}: memorization {:.3} (expected {:.2}, {:+.3})",
                    marker,
                    outcome.attractor_id,
                    outcome.model,
                    outcome.memorization,
                    outcome.expected,
                    outcome.delta_from_expected
                );
                if outcome.memorization < LOW_MEMORIZATION {
                    if let Some(response) = &outcome.response {
                        let preview: String = response.chars().take(80).collect();
                        println!("      response: {}", preview);
                    }
                }
            }
        }
    }

    println!("\nModels:");
    for summary in &report.summaries {
        println!(
            "  {}: {}/{} memorized ({:.1}%), mean score {:.3}{}",
            summary.model,
            summary.memorized,
            summary.total,
            summary.memorized_share() * 100.0,
            summary.mean_memorization,
            if summary.failed > 0 {
                format!(", {} failed", summary.failed)
            } else {
                String::new()
            }
        );
    }

    println!("\nAttractors by mean memorization:");
    for (rank, entry) in report.ranking.iter().enumerate() {
        println!(
            "  {}. {} ({:.3})",
            rank + 1,
            entry.attractor_id,
            entry.mean_memorization
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use crate::domain::attractor::catalog;
    use crate::domain::generation::MockGenerationProvider;
    use clap::Parser;

    fn args(extra: &[&str]) -> ValidateArgs {
        let mut argv = vec!["llm-dynamics", "validate"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Command::Validate(args) => args,
            _ => unreachable!(),
        }
    }

    fn config(dir: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.experiment.results_dir = dir.to_string_lossy().to_string();
        config
    }

    #[tokio::test]
    async fn test_validate_saves_report() {
        let dir = tempfile::tempdir().unwrap();
        let attractor = catalog::find("quijote_base").unwrap();
        let provider = Arc::new(MockGenerationProvider::new(attractor.continuation()));

        let path = execute(
            &config(dir.path()),
            &args(&["--attractors", "quijote_base", "--models", "m"]),
            provider.clone(),
        )
        .await
        .unwrap()
        .unwrap();

        let saved: ValidationReport =
            serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        let outcome = saved.outcome("quijote_base", "m").unwrap();
        assert!(outcome.is_memorized);
        assert_eq!(saved.models, vec!["m"]);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_validate_defaults_to_configured_models() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let provider = Arc::new(MockGenerationProvider::new("nothing memorized here"));

        let saved = execute(&config, &args(&["--no-save"]), provider.clone())
            .await
            .unwrap();

        assert!(saved.is_none());
        let expected_calls =
            catalog::suite(SuiteSize::Minimal).len() * config.experiment.models.len();
        assert_eq!(provider.call_count(), expected_calls);
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockGenerationProvider::new(""));

        let result = execute(
            &config(dir.path()),
            &args(&["--threshold", "2", "--no-save"]),
            provider,
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_validate_rejects_unknown_attractor() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(MockGenerationProvider::new(""));

        let result = execute(
            &config(dir.path()),
            &args(&["--attractors", "nope", "--no-save"]),
            provider.clone(),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(provider.call_count(), 0);
    }
}
