//! Attractors command - lists the built-in catalog

use clap::Args;

use crate::domain::attractor::{catalog, Attractor, AttractorCategory, SuiteSize};

/// Arguments for the attractors command
#[derive(Args, Clone, Debug)]
pub struct AttractorsArgs {
    /// Only attractors in this category
    #[arg(long)]
    pub category: Option<AttractorCategory>,

    /// Only attractors in this language (ISO code, e.g. en, es)
    #[arg(long)]
    pub language: Option<String>,

    /// Only attractors in this preset suite
    #[arg(long)]
    pub suite: Option<SuiteSize>,

    /// Also print the canonical passage
    #[arg(long)]
    pub verbose: bool,
}

pub fn run(args: AttractorsArgs) -> anyhow::Result<()> {
    let selected = select(&args);

    for attractor in &selected {
        println!(
            "{:<22} {:<3} {:<11} {:>5.2}  {}",
            attractor.id,
            attractor.language,
            attractor.category.as_str(),
            attractor.expected_memorization,
            attractor.prompt
        );
        if args.verbose {
            println!("{:<22} {}", "", attractor.canonical);
        }
    }

    println!("\n{} attractor(s)", selected.len());
    Ok(())
}

fn select(args: &AttractorsArgs) -> Vec<&'static Attractor> {
    let pool = match args.suite {
        Some(size) => catalog::suite(size),
        None => catalog::all().iter().collect(),
    };

    pool.into_iter()
        .filter(|a| args.category.is_none_or(|category| a.category == category))
        .filter(|a| {
            args.language
                .as_deref()
                .is_none_or(|language| a.language == language)
        })
        .collect()
}
