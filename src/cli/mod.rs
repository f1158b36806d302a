//! CLI module for llm-dynamics
//!
//! Subcommands:
//! - `run`: execute attractor × action × model experiments and save the run
//! - `analyze`: recompute statistical reports for a saved run
//! - `attractors`: list the built-in attractor catalog
//! - `actions`: preview what each action does to a prompt
//! - `validate`: check which attractors each model actually reproduces

pub mod actions;
pub mod analyze;
pub mod attractors;
pub mod run;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::{AppConfig, ExperimentSettings, GenerationConfig, ProviderKind};
use crate::domain::metrics::MetricName;
use crate::domain::GenerationProvider;
use crate::infrastructure::experiment::{Bootstrap, StatisticalEngine};
use crate::infrastructure::generation::{HttpClient, OpenRouterProvider};
use crate::infrastructure::logging;
use crate::infrastructure::services::{AnalysisService, ComparativeAnalysis};

/// LLM Controlled Dynamics - perturb attractor prompts and measure the shift
#[derive(Parser)]
#[command(name = "llm-dynamics")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Extra configuration file layered over config/default and config/local
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run experiments against the configured generation provider
    Run(run::RunArgs),

    /// Analyze a saved run
    Analyze(analyze::AnalyzeArgs),

    /// List built-in attractors
    Attractors(attractors::AttractorsArgs),

    /// Preview actions applied to a prompt
    Actions(actions::ActionsArgs),

    /// Check which attractors the models reproduce
    Validate(validate::ValidateArgs),
}

/// Read `.env`, load configuration and install the log subscriber
pub fn init(config_path: Option<&Path>) -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load_with(config_path)?;
    logging::init_logging(&config.logging);

    Ok(config)
}

/// Statistical engine for the configured alpha and bootstrap settings
pub fn statistical_engine(
    settings: &ExperimentSettings,
    alpha: Option<f64>,
) -> anyhow::Result<StatisticalEngine> {
    let bootstrap = Bootstrap::new(settings.bootstrap_resamples, settings.bootstrap_seed);
    Ok(StatisticalEngine::new(
        alpha.unwrap_or(settings.alpha),
        bootstrap,
    )?)
}

/// Analysis service with the configured comparative settings
pub fn analysis_service(
    settings: &ExperimentSettings,
    alpha: Option<f64>,
) -> anyhow::Result<AnalysisService> {
    Ok(
        AnalysisService::new(statistical_engine(settings, alpha)?).with_comparative(
            ComparativeAnalysis::new(MetricName::Memorization, settings.phase_threshold),
        ),
    )
}

/// Provider selected by the generation config
pub fn generation_provider(
    config: &GenerationConfig,
) -> anyhow::Result<Arc<dyn GenerationProvider>> {
    match config.provider {
        ProviderKind::OpenRouter => {
            let client = HttpClient::with_timeout(config.timeout())?;
            let provider =
                OpenRouterProvider::with_base_url(client, config.api_key()?, &config.base_url);
            Ok(Arc::new(provider))
        }
    }
}
