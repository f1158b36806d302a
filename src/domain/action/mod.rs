//! Action taxonomy: token, embedding-simulated and logit-level perturbations

mod apply;
pub mod battery;
mod catalog;
mod entity;

pub use apply::{apply, Perturbation};
pub use catalog::{
    ShockDomain, StyleDirection, DEFAULT_INSERTION_TOKEN, DEFAULT_SHOCK_TOKEN,
    DEFAULT_SUBSTITUTION_TOKEN, NOISE_WORDS, RARE_TOKENS,
};
pub use entity::{Action, ActionLevel, EmbeddingMode, InsertionOffset, ShockPoint};
