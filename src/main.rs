use clap::Parser;
use llm_dynamics::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli::init(cli.config.as_deref())?;

    match cli.command {
        Command::Run(args) => cli::run::run(config, args).await,
        Command::Analyze(args) => cli::analyze::run(config, args).await,
        Command::Attractors(args) => cli::attractors::run(args),
        Command::Actions(args) => cli::actions::run(config.experiment.sampling, args),
        Command::Validate(args) => cli::validate::run(config, args).await,
    }
}
