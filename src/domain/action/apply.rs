//! Pure prompt/config transformations for every action

use serde::{Deserialize, Serialize};

use super::catalog::{StyleDirection, NOISE_WORDS};
use super::entity::{Action, EmbeddingMode, InsertionOffset, ShockPoint};
use crate::domain::generation::{SamplingConfig, MAX_SAMPLING_KNOB};
use crate::domain::DomainError;

/// Result of applying an action to a control prompt and configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perturbation {
    pub prompt: String,
    pub config: SamplingConfig,
    /// False when the action left both prompt and configuration untouched
    pub applied: bool,
}

impl Perturbation {
    fn changed(prompt: String, config: SamplingConfig) -> Self {
        Self {
            prompt,
            config,
            applied: true,
        }
    }

    fn unchanged(prompt: &str, config: SamplingConfig) -> Self {
        Self {
            prompt: prompt.to_string(),
            config,
            applied: false,
        }
    }
}

/// Apply `action` to `prompt` and `config`
pub fn apply(
    action: &Action,
    prompt: &str,
    config: &SamplingConfig,
) -> Result<Perturbation, DomainError> {
    action.apply(prompt, config)
}

impl Action {
    /// Deterministically derive the modified prompt and configuration.
    ///
    /// Out-of-range positions are clamped; only structurally invalid
    /// parameters are rejected.
    pub fn apply(
        &self,
        prompt: &str,
        config: &SamplingConfig,
    ) -> Result<Perturbation, DomainError> {
        self.validate_inputs(prompt, config)?;
        let config = *config;

        let perturbation = match self {
            Self::TokenInsertion { token, offset } => {
                let modified = match offset {
                    InsertionOffset::Char(position) => insert_at_char(prompt, *position, token),
                    InsertionOffset::Word(position) => insert_at_word(prompt, *position, token),
                    InsertionOffset::End => insert_at_word(prompt, usize::MAX, token),
                };
                Perturbation::changed(modified, config)
            }
            Self::TokenSubstitution {
                target,
                replacement,
            } => {
                if prompt.contains(target.as_str()) {
                    Perturbation::changed(prompt.replacen(target.as_str(), replacement, 1), config)
                } else {
                    Perturbation::unchanged(prompt, config)
                }
            }
            Self::EmbeddingPerturbation { mode, magnitude } => {
                let magnitude = magnitude.min(1.0);
                match mode {
                    EmbeddingMode::Directional(direction) => Perturbation::changed(
                        format!("{}{}", directional_prefix(*direction, magnitude), prompt),
                        config,
                    ),
                    EmbeddingMode::Isotropic => {
                        let count = (magnitude * 3.0).floor() as usize;
                        if count == 0 {
                            Perturbation::unchanged(prompt, config)
                        } else {
                            let noise = NOISE_WORDS[..count].join(" ");
                            Perturbation::changed(format!("{} [{}]", prompt, noise), config)
                        }
                    }
                }
            }
            Self::LogitTailBias { strength, instruct } => {
                let strength = strength.min(1.0);
                let biased = config
                    .with_temperature(bump(config.temperature, strength))
                    .with_presence_penalty(bump(config.presence_penalty, strength))
                    .with_frequency_penalty(bump(config.frequency_penalty, strength));

                let modified = if *instruct {
                    format!("{}{}", tail_instruction(strength), prompt)
                } else {
                    prompt.to_string()
                };

                let applied = *instruct || biased != config;
                Perturbation {
                    prompt: modified,
                    config: biased,
                    applied,
                }
            }
            Self::MidSequenceShock { token, at } => {
                let words: Vec<&str> = prompt.split_whitespace().collect();
                let position = match at {
                    ShockPoint::Midpoint => words.len() / 2,
                    ShockPoint::Word(n) => *n,
                };
                Perturbation::changed(insert_at_word(prompt, position, token), config)
            }
            Self::SegmentShock {
                domain,
                offset_words,
            } => Perturbation::changed(
                insert_at_word(prompt, *offset_words, domain.primary_segment()),
                config,
            ),
        };

        Ok(perturbation)
    }
}

fn insert_at_char(prompt: &str, position: usize, token: &str) -> String {
    let byte_index = prompt
        .char_indices()
        .nth(position)
        .map(|(index, _)| index)
        .unwrap_or(prompt.len());
    splice(prompt, byte_index, token)
}

/// Insert `token` before the `position`-th whitespace-delimited word, or at
/// the end when the prompt has fewer words
fn insert_at_word(prompt: &str, position: usize, token: &str) -> String {
    let previous = std::iter::once(None).chain(prompt.chars().map(Some));
    let byte_index = prompt
        .char_indices()
        .zip(previous)
        .filter(|((_, c), prev)| !c.is_whitespace() && prev.map_or(true, char::is_whitespace))
        .map(|((index, _), _)| index)
        .nth(position)
        .unwrap_or(prompt.len());
    splice(prompt, byte_index, token)
}

/// Put `token` at `byte_index`, adding a separating space only on sides
/// that do not already have whitespace. The rest of the prompt is kept as is.
fn splice(prompt: &str, byte_index: usize, token: &str) -> String {
    let (before, after) = prompt.split_at(byte_index);
    let mut out = String::with_capacity(prompt.len() + token.len() + 2);

    out.push_str(before);
    if !before.is_empty() && !before.ends_with(char::is_whitespace) {
        out.push(' ');
    }
    out.push_str(token);
    if !after.is_empty() && !after.starts_with(char::is_whitespace) {
        out.push(' ');
    }
    out.push_str(after);
    out
}

fn directional_prefix(direction: StyleDirection, magnitude: f32) -> String {
    if magnitude < 0.3 {
        format!("(Slightly {}:) ", direction)
    } else if magnitude < 0.7 {
        format!("{} ", direction.instruction())
    } else {
        format!("IMPORTANT: {} ", direction.instruction())
    }
}

fn tail_instruction(strength: f32) -> &'static str {
    if strength < 0.3 {
        "(Use slightly unusual words) "
    } else if strength < 0.7 {
        "Use creative, uncommon vocabulary: "
    } else {
        "IMPORTANT: Use highly unusual, rare, and creative words: "
    }
}

fn bump(value: f32, strength: f32) -> f32 {
    (value + strength).min(MAX_SAMPLING_KNOB.max(value))
}
