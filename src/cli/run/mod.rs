//! Run command - executes experiments and saves the run artifact

use anyhow::anyhow;
use clap::Args;
use tracing::info;

use super::analyze::print_analysis;
use super::{analysis_service, generation_provider};
use crate::config::AppConfig;
use crate::domain::action::battery::{
    at_level, extended_battery, standard_battery, DEFAULT_SUBSTITUTION_TARGET,
};
use crate::domain::action::ActionLevel;
use crate::domain::attractor::{catalog, SuiteSize};
use crate::domain::{Action, Attractor};
use crate::infrastructure::experiment::ResultStore;
use crate::infrastructure::services::{ExperimentService, RunPlan};

/// Arguments for the run command
#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Attractor ids, comma separated (overrides --suite)
    #[arg(long, value_delimiter = ',')]
    pub attractors: Vec<String>,

    /// Preset attractor suite: minimal, standard or comprehensive
    #[arg(long, default_value = "minimal")]
    pub suite: SuiteSize,

    /// Only run actions at this level: token, embedding or logit
    #[arg(long)]
    pub level: Option<ActionLevel>,

    /// Use the extended action battery
    #[arg(long)]
    pub extended: bool,

    /// Word the substitution action replaces
    #[arg(long, default_value = DEFAULT_SUBSTITUTION_TARGET)]
    pub substitute: String,

    /// Models to query, comma separated (overrides config)
    #[arg(long, value_delimiter = ',')]
    pub models: Vec<String>,

    /// Replicates per condition (overrides config)
    #[arg(long)]
    pub replicates: Option<u32>,

    /// Sampling temperature (overrides config)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Maximum generated tokens (overrides config)
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Print reports without writing the run artifact
    #[arg(long)]
    pub no_save: bool,
}

/// Run the experiments described by `args` over `config`
pub async fn run(config: AppConfig, args: RunArgs) -> anyhow::Result<()> {
    let plan = build_plan(&config, &args)?;
    let provider = generation_provider(&config.generation)?;

    let service = ExperimentService::new(provider);
    let mut artifact = service.run(&plan).await?;

    artifact.analysis = analysis_service(&config.experiment, None)?.analyze_run(&artifact)?;

    print_analysis(&artifact.analysis);

    if artifact.skipped_replicates > 0 {
        println!(
            "\n{} replicate(s) skipped after generation failures",
            artifact.skipped_replicates
        );
    }

    if !args.no_save {
        let store = ResultStore::new(&config.experiment.results_dir);
        let path = store.save(&artifact).await?;
        info!(path = %path.display(), "Run saved");
        println!("\nSaved run to {}", path.display());
    }

    Ok(())
}

/// Combine configuration defaults with command-line overrides
pub fn build_plan(config: &AppConfig, args: &RunArgs) -> anyhow::Result<RunPlan> {
    let settings = &config.experiment;

    let mut sampling = settings.sampling;
    if let Some(temperature) = args.temperature {
        sampling = sampling.with_temperature(temperature);
    }
    if let Some(max_tokens) = args.max_tokens {
        sampling = sampling.with_max_tokens(max_tokens);
    }

    let models = if args.models.is_empty() {
        settings.models.clone()
    } else {
        args.models.clone()
    };

    let plan = RunPlan::new(sampling, args.replicates.unwrap_or(settings.replicates))
        .with_attractors(select_attractors(&args.attractors, args.suite)?)
        .with_actions(select_actions(args))
        .with_models(models);

    plan.validate()?;
    Ok(plan)
}

/// Catalog attractors by id, or the preset suite when no ids are given
pub(crate) fn select_attractors(
    ids: &[String],
    suite: SuiteSize,
) -> anyhow::Result<Vec<Attractor>> {
    if ids.is_empty() {
        return Ok(catalog::suite(suite).into_iter().cloned().collect());
    }

    ids.iter()
        .map(|id| {
            catalog::find(id)
                .cloned()
                .ok_or_else(|| anyhow!("Unknown attractor '{}'", id))
        })
        .collect()
}

fn select_actions(args: &RunArgs) -> Vec<Action> {
    let battery = if args.extended {
        extended_battery(&args.substitute)
    } else {
        standard_battery(&args.substitute)
    };

    match args.level {
        Some(level) => at_level(battery, level),
        None => battery,
    }
}
