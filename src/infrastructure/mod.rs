//! Infrastructure layer - engines and external service adapters

pub mod experiment;
pub mod generation;
pub mod logging;
pub mod observability;
pub mod services;
