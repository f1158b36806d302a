use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid action, metric or sampling parameters
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A statistical test was requested with too few observations
    #[error(
        "Insufficient samples: need at least {required} per condition, got control={control}, modified={modified}"
    )]
    InsufficientSample {
        required: usize,
        control: usize,
        modified: usize,
    },

    /// Opaque failure from a generation backend
    #[error("Generation error: {provider} - {message}")]
    Generation { provider: String, message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn insufficient_sample(required: usize, control: usize, modified: usize) -> Self {
        Self::InsufficientSample {
            required,
            control,
            modified,
        }
    }

    pub fn generation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// True when a statistical test could not run for lack of observations
    pub fn is_insufficient_sample(&self) -> bool {
        matches!(self, Self::InsufficientSample { .. })
    }

    /// True when the failure came from the generation backend
    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation { .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
