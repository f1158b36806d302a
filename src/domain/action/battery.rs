//! Preset action batteries

use super::catalog::{ShockDomain, StyleDirection};
use super::entity::{Action, ActionLevel, InsertionOffset};

/// Word replaced by the substitution experiment
pub const DEFAULT_SUBSTITUTION_TARGET: &str = "lugar";

pub const DEFAULT_EMBEDDING_MAGNITUDE: f32 = 0.7;

pub const DEFAULT_TAIL_STRENGTH: f32 = 0.8;

/// One action per experiment: insertion at the end of the prompt, rare-symbol
/// substitution of `substitution_target`, a technical style shift, tail bias
/// and a mid-sequence shock
pub fn standard_battery(substitution_target: &str) -> Vec<Action> {
    vec![
        Action::default_insertion(InsertionOffset::End),
        Action::rare_substitution(substitution_target),
        Action::directional(StyleDirection::Technical, DEFAULT_EMBEDDING_MAGNITUDE),
        Action::logit_tail_bias(DEFAULT_TAIL_STRENGTH),
        Action::default_shock(),
    ]
}

/// The standard battery plus isotropic noise, instructed tail bias and one
/// segment shock per domain
pub fn extended_battery(substitution_target: &str) -> Vec<Action> {
    let mut actions = standard_battery(substitution_target);
    actions.push(Action::isotropic(DEFAULT_EMBEDDING_MAGNITUDE));
    actions.push(Action::logit_tail_bias(DEFAULT_TAIL_STRENGTH).with_instruction());
    actions.extend(
        [ShockDomain::Technical, ShockDomain::Modern, ShockDomain::Absurd]
            .into_iter()
            .map(|domain| Action::segment_shock(domain, 3)),
    );
    actions
}

/// Keep only actions operating at `level`
pub fn at_level(actions: Vec<Action>, level: ActionLevel) -> Vec<Action> {
    actions
        .into_iter()
        .filter(|action| action.level() == level)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_battery_covers_every_level() {
        let actions = standard_battery(DEFAULT_SUBSTITUTION_TARGET);
        assert_eq!(actions.len(), 5);
        for level in [ActionLevel::Token, ActionLevel::Embedding, ActionLevel::Logit] {
            assert!(actions.iter().any(|a| a.level() == level));
        }
        assert!(actions.iter().all(|a| a.validate().is_ok()));
    }

    #[test]
    fn test_extended_battery_ids_unique() {
        let actions = extended_battery("Mancha");
        let mut ids: Vec<String> = actions.iter().map(Action::id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), actions.len());
    }

    #[test]
    fn test_substitution_hits_quixote_prompt() {
        let actions = standard_battery(DEFAULT_SUBSTITUTION_TARGET);
        let perturbation = actions[1]
            .apply("En un lugar de la Mancha,", &Default::default())
            .unwrap();
        assert!(perturbation.applied);
        assert_eq!(perturbation.prompt, "En un ∮ de la Mancha,");
    }

    #[test]
    fn test_at_level() {
        let logit = at_level(extended_battery("x"), ActionLevel::Logit);
        assert_eq!(logit.len(), 2);
    }
}
