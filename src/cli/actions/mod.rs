//! Actions command - shows what each action does to a prompt

use clap::Args;

use crate::domain::action::battery::{
    at_level, extended_battery, standard_battery, DEFAULT_SUBSTITUTION_TARGET,
};
use crate::domain::action::ActionLevel;
use crate::domain::{Action, Perturbation, SamplingConfig};

const DEFAULT_PROMPT: &str = "En un lugar de la Mancha,";

/// Arguments for the actions command
#[derive(Args, Clone, Debug)]
pub struct ActionsArgs {
    /// Prompt to perturb
    #[arg(long, default_value = DEFAULT_PROMPT)]
    pub prompt: String,

    /// Only actions at this level: token, embedding or logit
    #[arg(long)]
    pub level: Option<ActionLevel>,

    /// Use the extended action battery
    #[arg(long)]
    pub extended: bool,

    /// Word the substitution action replaces
    #[arg(long, default_value = DEFAULT_SUBSTITUTION_TARGET)]
    pub substitute: String,
}

pub fn run(sampling: SamplingConfig, args: ActionsArgs) -> anyhow::Result<()> {
    for (action, perturbation) in preview(&sampling, &args)? {
        println!("{} [{}]", action.id(), action.level());
        println!("  prompt:  {}", perturbation.prompt);
        if perturbation.config != sampling {
            println!(
                "  config:  temperature {:.2} -> {:.2}, presence {:.2} -> {:.2}, frequency {:.2} -> {:.2}",
                sampling.temperature,
                perturbation.config.temperature,
                sampling.presence_penalty,
                perturbation.config.presence_penalty,
                sampling.frequency_penalty,
                perturbation.config.frequency_penalty,
            );
        }
        if !perturbation.applied {
            println!("  no-op:   prompt and config unchanged");
        }
        if let Some(limitation) = action.limitation() {
            println!("  simulated: {}", limitation);
        }
        println!();
    }

    Ok(())
}

fn preview(
    sampling: &SamplingConfig,
    args: &ActionsArgs,
) -> anyhow::Result<Vec<(Action, Perturbation)>> {
    let battery = if args.extended {
        extended_battery(&args.substitute)
    } else {
        standard_battery(&args.substitute)
    };
    let actions = match args.level {
        Some(level) => at_level(battery, level),
        None => battery,
    };

    actions
        .into_iter()
        .map(|action| {
            let perturbation = action.apply(&args.prompt, sampling)?;
            Ok((action, perturbation))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ActionsArgs {
        ActionsArgs {
            prompt: DEFAULT_PROMPT.to_string(),
            level: None,
            extended: false,
            substitute: DEFAULT_SUBSTITUTION_TARGET.to_string(),
        }
    }

    #[test]
    fn test_preview_standard_battery() {
        let previews = preview(&SamplingConfig::default(), &args()).unwrap();

        assert_eq!(previews.len(), 5);
        assert!(previews.iter().all(|(_, p)| p.applied));
    }

    #[test]
    fn test_absent_substitution_target_is_noop() {
        let previews = preview(
            &SamplingConfig::default(),
            &ActionsArgs {
                prompt: "To be, or not to be,".to_string(),
                level: Some(ActionLevel::Token),
                ..args()
            },
        )
        .unwrap();

        let (_, substitution) = previews
            .iter()
            .find(|(action, _)| matches!(action, Action::TokenSubstitution { .. }))
            .unwrap();
        assert!(!substitution.applied);
        assert_eq!(substitution.prompt, "To be, or not to be,");
    }

    #[test]
    fn test_empty_prompt_is_configuration_error() {
        let result = preview(
            &SamplingConfig::default(),
            &ActionsArgs {
                prompt: "   ".to_string(),
                ..args()
            },
        );
        assert!(result.is_err());
    }
}
