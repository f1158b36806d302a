//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, ExperimentSettings, GenerationConfig, LogFormat, LoggingConfig, ProviderKind,
    ENV_PREFIX,
};
