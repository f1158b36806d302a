//! Experiment identity and condition labels

use serde::{Deserialize, Serialize};
use std::fmt;

/// Branch of one experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Unperturbed prompt and configuration
    Control,
    /// Prompt and configuration after applying the action
    Modified,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::Modified => "modified",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The (attractor, action, model) triple statistical tests are grouped by
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExperimentKey {
    pub attractor_id: String,
    pub action_id: String,
    pub model_id: String,
}

impl ExperimentKey {
    pub fn new(
        attractor_id: impl Into<String>,
        action_id: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            attractor_id: attractor_id.into(),
            action_id: action_id.into(),
            model_id: model_id.into(),
        }
    }
}

impl fmt::Display for ExperimentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {}",
            self.attractor_id, self.action_id, self.model_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let key = ExperimentKey::new(
            "quijote_base",
            "logit_tail_bias:0.50",
            "openai/gpt-4o-mini",
        );
        assert_eq!(
            key.to_string(),
            "quijote_base / logit_tail_bias:0.50 / openai/gpt-4o-mini"
        );
        assert_eq!(Condition::Modified.to_string(), "modified");
    }
}
