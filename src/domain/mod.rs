//! Domain layer - actions, metrics and experiment types
//!
//! Everything here is pure and synchronous. The only seam to the outside
//! world is the [`GenerationProvider`] trait.

pub mod action;
pub mod attractor;
pub mod error;
pub mod experiment;
pub mod generation;
pub mod metrics;

pub use action::{apply, Action, ActionLevel, Perturbation};
pub use attractor::Attractor;
pub use error::DomainError;
pub use experiment::{
    ComparisonReport, Condition, ExperimentKey, ExperimentReport, MetricResult, TTestResult,
};
pub use generation::{GenerationProvider, GenerationSample, SamplingConfig};
pub use metrics::{DivergenceSuite, MetricName, MetricVector};
