//! Attractors: prompts with a strongly favored, reproducible continuation

pub mod catalog;
mod entity;

pub use entity::{
    Attractor, AttractorCategory, AttractorTier, SuiteSize, DEFAULT_MEMORIZATION_THRESHOLD,
};
