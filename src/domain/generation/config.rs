use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Upper bound accepted by OpenAI-compatible backends for temperature and penalties
pub const MAX_SAMPLING_KNOB: f32 = 2.0;

/// Sampling parameters for one generation request
///
/// Immutable value: actions derive a modified copy instead of mutating it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 150,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

impl SamplingConfig {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = penalty;
        self
    }

    pub fn with_presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = penalty;
        self
    }

    /// Reject values no backend could honour
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(DomainError::configuration(format!(
                "temperature must be a finite value >= 0, got {}",
                self.temperature
            )));
        }

        if self.max_tokens == 0 {
            return Err(DomainError::configuration("max_tokens must be > 0"));
        }

        if !self.top_p.is_finite() || self.top_p <= 0.0 || self.top_p > 1.0 {
            return Err(DomainError::configuration(format!(
                "top_p must be in (0, 1], got {}",
                self.top_p
            )));
        }

        for (name, value) in [
            ("frequency_penalty", self.frequency_penalty),
            ("presence_penalty", self.presence_penalty),
        ] {
            if !value.is_finite() {
                return Err(DomainError::configuration(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SamplingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_tokens, 150);
        assert_eq!(config.top_p, 1.0);
    }

    #[test]
    fn test_builder_style_setters() {
        let config = SamplingConfig::new(0.0, 64)
            .with_top_p(0.9)
            .with_presence_penalty(0.5)
            .with_frequency_penalty(0.25);

        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_tokens, 64);
        assert_eq!(config.top_p, 0.9);
        assert_eq!(config.presence_penalty, 0.5);
        assert_eq!(config.frequency_penalty, 0.25);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(SamplingConfig::default().with_max_tokens(0).validate().is_err());
        assert!(SamplingConfig::default().with_temperature(-0.1).validate().is_err());
        assert!(SamplingConfig::default()
            .with_temperature(f32::NAN)
            .validate()
            .is_err());
        assert!(SamplingConfig::default().with_top_p(0.0).validate().is_err());
        assert!(SamplingConfig::default().with_top_p(1.5).validate().is_err());
        assert!(SamplingConfig::default()
            .with_presence_penalty(f32::INFINITY)
            .validate()
            .is_err());
    }
}
