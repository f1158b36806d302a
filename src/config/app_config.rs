use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use validator::Validate;

use crate::domain::attractor::DEFAULT_MEMORIZATION_THRESHOLD;
use crate::domain::{DomainError, SamplingConfig};
use crate::infrastructure::experiment::{BOOTSTRAP_RESAMPLES, BOOTSTRAP_SEED, DEFAULT_ALPHA};
use crate::infrastructure::generation::DEFAULT_OPENROUTER_BASE_URL;
use crate::infrastructure::services::DEFAULT_PHASE_THRESHOLD;

/// Prefix of environment overrides, e.g. `LLMDYN__EXPERIMENT__REPLICATES=5`
pub const ENV_PREFIX: &str = "LLMDYN";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    #[validate(nested)]
    pub generation: GenerationConfig,
    #[validate(nested)]
    pub experiment: ExperimentSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Generation backends the binary can construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenRouter,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct GenerationConfig {
    pub provider: ProviderKind,
    #[validate(length(min = 1))]
    pub base_url: String,
    /// Name of the environment variable holding the API key
    #[validate(length(min = 1))]
    pub api_key_env: String,
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct ExperimentSettings {
    pub models: Vec<String>,
    #[validate(range(min = 1))]
    pub replicates: u32,
    pub sampling: SamplingConfig,
    #[validate(range(min = 1))]
    pub bootstrap_resamples: usize,
    pub bootstrap_seed: u64,
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub alpha: f64,
    /// |delta| above which an experiment is reported as a phase transition
    #[validate(range(min = 0.0))]
    pub phase_threshold: f64,
    /// Memorization score at which `validate` counts an attractor as reproduced
    #[validate(range(min = 0.0, max = 1.0))]
    pub memorization_threshold: f64,
    pub results_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for ExperimentSettings {
    fn default() -> Self {
        Self {
            models: vec![
                "meta-llama/llama-3-8b-instruct".to_string(),
                "mistralai/mistral-7b-instruct".to_string(),
            ],
            replicates: 5,
            sampling: SamplingConfig::default(),
            bootstrap_resamples: BOOTSTRAP_RESAMPLES,
            bootstrap_seed: BOOTSTRAP_SEED,
            alpha: DEFAULT_ALPHA,
            phase_threshold: DEFAULT_PHASE_THRESHOLD,
            memorization_threshold: DEFAULT_MEMORIZATION_THRESHOLD,
            results_dir: "results".to_string(),
        }
    }
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String, DomainError> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                DomainError::configuration(format!(
                    "{} is not set; export it or add it to .env",
                    self.api_key_env
                ))
            })
    }
}

impl AppConfig {
    /// Load `config/default.*`, `config/local.*` and `LLMDYN__*` overrides
    pub fn load() -> Result<Self, DomainError> {
        Self::load_with(None)
    }

    /// Like [`AppConfig::load`], with an extra required file layered on top
    /// of the optional ones
    pub fn load_with(extra: Option<&Path>) -> Result<Self, DomainError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        if let Some(path) = extra {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("experiment.models"),
            )
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to load config: {}", e)))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| DomainError::configuration(format!("Invalid config: {}", e)))?;

        config.check()?;
        Ok(config)
    }

    /// Validate every section, including the sampling parameters
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()
            .map_err(|e| DomainError::configuration(format!("Invalid config: {}", e)))?;
        self.experiment.sampling.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.check().is_ok());
        assert_eq!(config.experiment.bootstrap_resamples, 10_000);
        assert_eq!(config.experiment.bootstrap_seed, 42);
        assert_eq!(config.experiment.alpha, 0.05);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_zero_replicates_rejected() {
        let mut config = AppConfig::default();
        config.experiment.replicates = 0;
        assert!(config.check().unwrap_err().is_configuration());
    }

    #[test]
    fn test_alpha_bounds_exclusive() {
        let mut config = AppConfig::default();
        config.experiment.alpha = 1.0;
        assert!(config.check().is_err());
        config.experiment.alpha = 0.0;
        assert!(config.check().is_err());
        config.experiment.alpha = 0.01;
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_thresholds() {
        let mut config = AppConfig::default();
        assert_eq!(config.experiment.phase_threshold, 0.5);
        assert_eq!(config.experiment.memorization_threshold, 0.8);

        config.experiment.memorization_threshold = 1.2;
        assert!(config.check().is_err());
        config.experiment.memorization_threshold = 0.8;
        config.experiment.phase_threshold = -0.1;
        assert!(config.check().is_err());
    }

    #[test]
    fn test_zero_resamples_rejected() {
        let mut config = AppConfig::default();
        config.experiment.bootstrap_resamples = 0;
        assert!(config.check().is_err());
    }

    #[test]
    fn test_invalid_sampling_rejected() {
        let mut config = AppConfig::default();
        config.experiment.sampling.max_tokens = 0;
        assert!(config.check().is_err());
    }

    #[test]
    fn test_load_with_file_overrides() {
        let file = write_config(
            r#"
            [logging]
            format = "json"

            [experiment]
            models = ["openai/gpt-4o-mini"]
            replicates = 12

            [experiment.sampling]
            temperature = 0.0
            "#,
        );

        let config = AppConfig::load_with(Some(file.path())).unwrap();

        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.experiment.models, vec!["openai/gpt-4o-mini"]);
        assert_eq!(config.experiment.replicates, 12);
        assert_eq!(config.experiment.sampling.temperature, 0.0);
        assert_eq!(config.experiment.sampling.max_tokens, 150);
    }

    #[test]
    fn test_load_with_invalid_file_is_configuration_error() {
        let file = write_config("[experiment]\nalpha = 2.0\n");

        let err = AppConfig::load_with(Some(file.path())).unwrap_err();

        assert!(err.is_configuration());
    }

    #[test]
    fn test_missing_api_key_env() {
        let config = GenerationConfig {
            api_key_env: "LLMDYN_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..GenerationConfig::default()
        };
        assert!(config.api_key().unwrap_err().is_configuration());
    }
}
