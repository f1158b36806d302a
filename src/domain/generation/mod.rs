//! Generation capability: sampling parameters, samples and the provider trait

mod config;
mod provider;
mod sample;

pub use config::{SamplingConfig, MAX_SAMPLING_KNOB};
pub use provider::GenerationProvider;
pub use sample::{lexical_token_ids, FinishReason, GenerationSample};

#[cfg(test)]
pub use provider::mock::MockGenerationProvider;
