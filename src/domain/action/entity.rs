//! Action entity: a categorized, parameterized perturbation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::catalog::{
    ShockDomain, StyleDirection, DEFAULT_INSERTION_TOKEN, DEFAULT_SHOCK_TOKEN,
    DEFAULT_SUBSTITUTION_TOKEN,
};
use crate::domain::generation::SamplingConfig;
use crate::domain::DomainError;

// ============================================================================
// ActionLevel
// ============================================================================

/// Intervention level an action operates at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionLevel {
    Token,
    Embedding,
    Logit,
}

impl ActionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Embedding => "embedding",
            Self::Logit => "logit",
        }
    }
}

impl fmt::Display for ActionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "token" => Ok(Self::Token),
            "embedding" => Ok(Self::Embedding),
            "logit" => Ok(Self::Logit),
            other => Err(DomainError::configuration(format!(
                "Unknown action level '{}', expected token, embedding or logit",
                other
            ))),
        }
    }
}

// ============================================================================
// Action parameters
// ============================================================================

/// Where a token insertion lands in the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertionOffset {
    /// Character offset, clamped to the prompt length
    Char(usize),
    /// Whitespace-delimited word index, clamped to the word count
    Word(usize),
    /// After the last word
    End,
}

impl fmt::Display for InsertionOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(n) => write!(f, "char{}", n),
            Self::Word(n) => write!(f, "word{}", n),
            Self::End => write!(f, "end"),
        }
    }
}

/// Injection point of a mid-sequence shock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShockPoint {
    #[default]
    Midpoint,
    Word(usize),
}

impl fmt::Display for ShockPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Midpoint => write!(f, "mid"),
            Self::Word(n) => write!(f, "word{}", n),
        }
    }
}

/// How a simulated embedding perturbation shifts the representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingMode {
    /// Push along a named style direction
    Directional(StyleDirection),
    /// Undirected noise made of unrelated words
    Isotropic,
}

impl fmt::Display for EmbeddingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directional(direction) => write!(f, "{}", direction),
            Self::Isotropic => write!(f, "isotropic"),
        }
    }
}

// ============================================================================
// Action
// ============================================================================

/// A perturbation applied to a prompt and sampling configuration before generation.
///
/// Actions never generate text. Applying one is a pure transformation of the
/// prompt and configuration (see `Action::apply`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Insert a literal out-of-distribution marker
    TokenInsertion {
        token: String,
        offset: InsertionOffset,
    },
    /// Replace the first occurrence of `target` with a rare symbol
    TokenSubstitution { target: String, replacement: String },
    /// Instruction-framing approximation of an embedding-space shift
    EmbeddingPerturbation { mode: EmbeddingMode, magnitude: f32 },
    /// Bias sampling toward low-probability continuations
    LogitTailBias {
        strength: f32,
        #[serde(default)]
        instruct: bool,
    },
    /// Disruptive marker placed mid-text for single-pass backends
    MidSequenceShock {
        token: String,
        #[serde(default)]
        at: ShockPoint,
    },
    /// Out-of-domain phrase inserted at a word offset
    SegmentShock {
        domain: ShockDomain,
        offset_words: usize,
    },
}

impl Action {
    pub fn token_insertion(token: impl Into<String>, offset: InsertionOffset) -> Self {
        Self::TokenInsertion {
            token: token.into(),
            offset,
        }
    }

    /// Insertion of the default marker token
    pub fn default_insertion(offset: InsertionOffset) -> Self {
        Self::token_insertion(DEFAULT_INSERTION_TOKEN, offset)
    }

    pub fn token_substitution(target: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::TokenSubstitution {
            target: target.into(),
            replacement: replacement.into(),
        }
    }

    /// Substitution of `target` with the default rare symbol
    pub fn rare_substitution(target: impl Into<String>) -> Self {
        Self::token_substitution(target, DEFAULT_SUBSTITUTION_TOKEN)
    }

    pub fn directional(direction: StyleDirection, magnitude: f32) -> Self {
        Self::EmbeddingPerturbation {
            mode: EmbeddingMode::Directional(direction),
            magnitude,
        }
    }

    pub fn isotropic(magnitude: f32) -> Self {
        Self::EmbeddingPerturbation {
            mode: EmbeddingMode::Isotropic,
            magnitude,
        }
    }

    pub fn logit_tail_bias(strength: f32) -> Self {
        Self::LogitTailBias {
            strength,
            instruct: false,
        }
    }

    /// Also prefix the prompt with an instruction to prefer unusual vocabulary
    pub fn with_instruction(self) -> Self {
        match self {
            Self::LogitTailBias { strength, .. } => Self::LogitTailBias {
                strength,
                instruct: true,
            },
            other => other,
        }
    }

    pub fn mid_sequence_shock(token: impl Into<String>, at: ShockPoint) -> Self {
        Self::MidSequenceShock {
            token: token.into(),
            at,
        }
    }

    /// Shock with the default marker at the prompt midpoint
    pub fn default_shock() -> Self {
        Self::mid_sequence_shock(DEFAULT_SHOCK_TOKEN, ShockPoint::Midpoint)
    }

    pub fn segment_shock(domain: ShockDomain, offset_words: usize) -> Self {
        Self::SegmentShock {
            domain,
            offset_words,
        }
    }

    pub fn level(&self) -> ActionLevel {
        match self {
            Self::TokenInsertion { .. }
            | Self::TokenSubstitution { .. }
            | Self::MidSequenceShock { .. }
            | Self::SegmentShock { .. } => ActionLevel::Token,
            Self::EmbeddingPerturbation { .. } => ActionLevel::Embedding,
            Self::LogitTailBias { .. } => ActionLevel::Logit,
        }
    }

    /// Whether the action only approximates the intervention it names
    pub fn is_simulated(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingPerturbation { .. }
                | Self::LogitTailBias { .. }
                | Self::MidSequenceShock { .. }
        )
    }

    /// Documented gap between the simulated action and the real intervention
    pub fn limitation(&self) -> Option<&'static str> {
        match self {
            Self::EmbeddingPerturbation { .. } => Some(
                "embedding access is unavailable; the shift is approximated by instruction framing",
            ),
            Self::LogitTailBias { .. } => Some(
                "logits are not exposed; the tail is amplified through sampling knobs",
            ),
            Self::MidSequenceShock { .. } => Some(
                "single-pass approximation; true mid-generation injection needs a streaming backend",
            ),
            _ => None,
        }
    }

    /// Stable identifier used in result metadata
    pub fn id(&self) -> String {
        match self {
            Self::TokenInsertion { token, offset } => {
                format!("token_insertion:{}@{}", token, offset)
            }
            Self::TokenSubstitution {
                target,
                replacement,
            } => format!("token_substitution:{}->{}", target, replacement),
            Self::EmbeddingPerturbation { mode, magnitude } => {
                format!("embedding_perturbation:{}@{:.2}", mode, magnitude)
            }
            Self::LogitTailBias { strength, instruct } => {
                let suffix = if *instruct { "+instruct" } else { "" };
                format!("logit_tail_bias:{:.2}{}", strength, suffix)
            }
            Self::MidSequenceShock { token, at } => {
                format!("mid_sequence_shock:{}@{}", token, at)
            }
            Self::SegmentShock {
                domain,
                offset_words,
            } => format!("segment_shock:{}@word{}", domain, offset_words),
        }
    }

    /// Reject structurally invalid parameters before any transformation
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Self::TokenInsertion { token, .. } | Self::MidSequenceShock { token, .. } => {
                if token.trim().is_empty() {
                    return Err(DomainError::configuration("Inserted token cannot be empty"));
                }
            }
            Self::TokenSubstitution {
                target,
                replacement,
            } => {
                if target.is_empty() {
                    return Err(DomainError::configuration(
                        "Substitution target cannot be empty",
                    ));
                }
                if replacement.is_empty() {
                    return Err(DomainError::configuration(
                        "Substitution replacement cannot be empty",
                    ));
                }
            }
            Self::EmbeddingPerturbation { magnitude, .. } => {
                validate_intensity("magnitude", *magnitude)?;
            }
            Self::LogitTailBias { strength, .. } => {
                validate_intensity("strength", *strength)?;
            }
            Self::SegmentShock { .. } => {}
        }
        Ok(())
    }

    /// Validate the prompt and configuration an action is about to transform
    pub(super) fn validate_inputs(
        &self,
        prompt: &str,
        config: &SamplingConfig,
    ) -> Result<(), DomainError> {
        if prompt.trim().is_empty() {
            return Err(DomainError::configuration("Prompt cannot be empty"));
        }
        config.validate()?;
        self.validate()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

fn validate_intensity(name: &str, value: f32) -> Result<(), DomainError> {
    if !value.is_finite() {
        return Err(DomainError::configuration(format!(
            "Action {} must be finite",
            name
        )));
    }
    if value < 0.0 {
        return Err(DomainError::configuration(format!(
            "Action {} cannot be negative, got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod level_tests {
        use super::*;

        #[test]
        fn test_levels() {
            assert_eq!(
                Action::default_insertion(InsertionOffset::Char(0)).level(),
                ActionLevel::Token
            );
            assert_eq!(Action::rare_substitution("x").level(), ActionLevel::Token);
            assert_eq!(
                Action::directional(StyleDirection::Poetic, 0.5).level(),
                ActionLevel::Embedding
            );
            assert_eq!(Action::logit_tail_bias(0.5).level(), ActionLevel::Logit);
            assert_eq!(Action::default_shock().level(), ActionLevel::Token);
        }

        #[test]
        fn test_level_parse() {
            assert_eq!("logit".parse::<ActionLevel>().unwrap(), ActionLevel::Logit);
            assert!("neuron".parse::<ActionLevel>().is_err());
        }

        #[test]
        fn test_simulated_actions_document_their_limitation() {
            let actions = vec![
                Action::default_insertion(InsertionOffset::Word(1)),
                Action::rare_substitution("the"),
                Action::isotropic(0.5),
                Action::logit_tail_bias(0.3),
                Action::default_shock(),
                Action::segment_shock(ShockDomain::Modern, 2),
            ];

            for action in actions {
                assert_eq!(action.is_simulated(), action.limitation().is_some());
            }
        }

        #[test]
        fn test_embedding_is_simulated() {
            let action = Action::directional(StyleDirection::Technical, 0.8);
            assert!(action.is_simulated());
            assert!(action.limitation().unwrap().contains("approximated"));
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn test_negative_magnitude_rejected() {
            let err = Action::isotropic(-0.1).validate().unwrap_err();
            assert!(err.is_configuration());
        }

        #[test]
        fn test_non_finite_strength_rejected() {
            assert!(Action::logit_tail_bias(f32::NAN).validate().is_err());
            assert!(Action::logit_tail_bias(f32::INFINITY).validate().is_err());
        }

        #[test]
        fn test_empty_token_rejected() {
            assert!(
                Action::token_insertion("  ", InsertionOffset::Char(0))
                    .validate()
                    .is_err()
            );
            assert!(Action::token_substitution("", "∮").validate().is_err());
            assert!(Action::token_substitution("a", "").validate().is_err());
        }

        #[test]
        fn test_out_of_range_parameters_are_valid() {
            assert!(
                Action::default_insertion(InsertionOffset::Char(10_000))
                    .validate()
                    .is_ok()
            );
            assert!(Action::isotropic(5.0).validate().is_ok());
        }
    }

    mod serde_tests {
        use super::*;

        #[test]
        fn test_tagged_representation() {
            let action = Action::directional(StyleDirection::Archaic, 0.5);
            let json = serde_json::to_value(&action).unwrap();
            assert_eq!(json["type"], "embedding_perturbation");
            assert_eq!(json["mode"]["directional"], "archaic");
        }

        #[test]
        fn test_deserialize_with_defaults() {
            let action: Action =
                serde_json::from_str(r#"{"type":"mid_sequence_shock","token":"<ANOMALY>"}"#)
                    .unwrap();
            assert_eq!(
                action,
                Action::mid_sequence_shock("<ANOMALY>", ShockPoint::Midpoint)
            );
        }
    }

    #[test]
    fn test_ids_are_stable() {
        assert_eq!(
            Action::default_insertion(InsertionOffset::Char(12)).id(),
            "token_insertion:<ISO-2847>@char12"
        );
        assert_eq!(
            Action::logit_tail_bias(0.5).with_instruction().id(),
            "logit_tail_bias:0.50+instruct"
        );
        assert_eq!(
            Action::segment_shock(ShockDomain::Absurd, 3).to_string(),
            "segment_shock:absurd@word3"
        );
    }
}
