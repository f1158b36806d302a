use async_trait::async_trait;
use std::fmt::Debug;

use super::{GenerationSample, SamplingConfig};
use crate::domain::DomainError;

/// Text-generation backend consumed by the experiment orchestrator
///
/// Implementations may be called repeatedly and concurrently; each call is
/// independent. Failures surface as `DomainError::Generation` and are never
/// retried by callers in this crate.
#[async_trait]
pub trait GenerationProvider: Send + Sync + Debug {
    /// Generate one continuation of `prompt` with `model`
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        config: &SamplingConfig,
    ) -> Result<GenerationSample, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Whether the backend can pause and resume a generation mid-sequence
    fn supports_streaming(&self) -> bool {
        false
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Scripted provider: answers by prompt substring, can fail on chosen calls
    #[derive(Debug)]
    pub struct MockGenerationProvider {
        rules: Vec<(String, String)>,
        default_text: String,
        failing_calls: HashSet<usize>,
        calls: Mutex<Vec<(String, String, SamplingConfig)>>,
    }

    impl MockGenerationProvider {
        pub fn new(default_text: impl Into<String>) -> Self {
            Self {
                rules: Vec::new(),
                default_text: default_text.into(),
                failing_calls: HashSet::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Answer with `text` whenever the prompt contains `needle`
        pub fn with_rule(mut self, needle: impl Into<String>, text: impl Into<String>) -> Self {
            self.rules.push((needle.into(), text.into()));
            self
        }

        /// Fail the n-th call (0-based)
        pub fn failing_on_call(mut self, index: usize) -> Self {
            self.failing_calls.insert(index);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls(&self) -> Vec<(String, String, SamplingConfig)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationProvider for MockGenerationProvider {
        async fn generate(
            &self,
            model: &str,
            prompt: &str,
            config: &SamplingConfig,
        ) -> Result<GenerationSample, DomainError> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((model.to_string(), prompt.to_string(), *config));
                calls.len() - 1
            };

            if self.failing_calls.contains(&index) {
                return Err(DomainError::generation("mock", "scripted failure"));
            }

            let text = self
                .rules
                .iter()
                .find(|(needle, _)| prompt.contains(needle.as_str()))
                .map(|(_, text)| text.clone())
                .unwrap_or_else(|| self.default_text.clone());

            Ok(GenerationSample::from_text(text).with_model(model))
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
