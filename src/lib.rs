//! LLM Controlled Dynamics
//!
//! Measures how discrete perturbations of a prompt change a language model's
//! output relative to an unperturbed control:
//! - Action taxonomy at token, simulated-embedding and logit level
//! - Divergence metrics between control and modified generations
//! - Statistical comparison with bootstrap intervals, effect sizes and
//!   Bonferroni correction
//! - Orchestration over attractors × actions × models against an
//!   OpenRouter-compatible backend

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
