//! The fixed divergence metric set and the suite that computes it

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::distribution::{js_divergence, kl_divergence};
use super::lexical::{cosine_similarity, stability_score, text_edit_distance, token_overlap};
use super::text::{exact_match, memorization_score, prefix_match_words};
use super::trajectory::{relative_divergence, structural_similarity};
use crate::domain::generation::GenerationSample;
use crate::domain::DomainError;

// ============================================================================
// MetricName
// ============================================================================

/// Name of an observable in the divergence suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    ExactMatch,
    TokenOverlap,
    NormalizedEditDistance,
    Memorization,
    KlDivergence,
    JsDivergence,
    CosineSimilarity,
    DivergencePoint,
    StructuralSimilarity,
    Stability,
    PrefixMatch,
}

impl MetricName {
    pub const ALL: [MetricName; 11] = [
        Self::ExactMatch,
        Self::TokenOverlap,
        Self::NormalizedEditDistance,
        Self::Memorization,
        Self::KlDivergence,
        Self::JsDivergence,
        Self::CosineSimilarity,
        Self::DivergencePoint,
        Self::StructuralSimilarity,
        Self::Stability,
        Self::PrefixMatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactMatch => "exact_match",
            Self::TokenOverlap => "token_overlap",
            Self::NormalizedEditDistance => "normalized_edit_distance",
            Self::Memorization => "memorization",
            Self::KlDivergence => "kl_divergence",
            Self::JsDivergence => "js_divergence",
            Self::CosineSimilarity => "cosine_similarity",
            Self::DivergencePoint => "divergence_point",
            Self::StructuralSimilarity => "structural_similarity",
            Self::Stability => "stability",
            Self::PrefixMatch => "prefix_match",
        }
    }

    /// Whether larger values mean the two outputs are closer
    pub fn higher_is_similar(&self) -> bool {
        !matches!(
            self,
            Self::NormalizedEditDistance | Self::KlDivergence | Self::JsDivergence
        )
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|name| name.as_str() == s)
            .copied()
            .ok_or_else(|| DomainError::configuration(format!("Unknown metric '{}'", s)))
    }
}

// ============================================================================
// MetricVector
// ============================================================================

/// Ordered mapping metric name -> value for one comparison
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricVector(BTreeMap<MetricName, f64>);

impl MetricVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: MetricName, value: f64) {
        self.0.insert(name, value);
    }

    pub fn with(mut self, name: MetricName, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: MetricName) -> Option<f64> {
        self.0.get(&name).copied()
    }

    pub fn contains(&self, name: MetricName) -> bool {
        self.0.contains_key(&name)
    }

    pub fn names(&self) -> impl Iterator<Item = MetricName> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricName, f64)> + '_ {
        self.0.iter().map(|(name, value)| (*name, *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// DivergenceSuite
// ============================================================================

/// Computes the full metric vector between two generated outputs
#[derive(Debug, Clone, Copy, Default)]
pub struct DivergenceSuite;

impl DivergenceSuite {
    pub fn new() -> Self {
        Self
    }

    /// Compare `a` against `b`. Memorization scores `b` against `reference`
    /// and is only present when a reference is given.
    ///
    /// `DivergencePoint` is stored as the relative position of the first
    /// differing token (1.0 when the streams never differ), never as the raw
    /// index with its -1 sentinel, so it can be averaged and compared.
    pub fn compare(
        &self,
        a: &GenerationSample,
        b: &GenerationSample,
        reference: Option<&str>,
    ) -> MetricVector {
        let mut metrics = MetricVector::new()
            .with(MetricName::ExactMatch, exact_match(&a.text, &b.text))
            .with(
                MetricName::TokenOverlap,
                token_overlap(&a.token_ids, &b.token_ids),
            )
            .with(
                MetricName::NormalizedEditDistance,
                text_edit_distance(&a.text, &b.text),
            )
            .with(
                MetricName::KlDivergence,
                kl_divergence(&a.token_ids, &b.token_ids),
            )
            .with(
                MetricName::JsDivergence,
                js_divergence(&a.token_ids, &b.token_ids),
            )
            .with(
                MetricName::CosineSimilarity,
                cosine_similarity(&a.token_ids, &b.token_ids),
            )
            .with(
                MetricName::DivergencePoint,
                relative_divergence(&a.token_ids, &b.token_ids),
            )
            .with(
                MetricName::StructuralSimilarity,
                structural_similarity(&a.text, &b.text),
            )
            .with(MetricName::Stability, stability_score(&a.text, &b.text))
            .with(
                MetricName::PrefixMatch,
                prefix_match_words(&a.text, &b.text) as f64,
            );

        if let Some(reference) = reference {
            metrics.insert(
                MetricName::Memorization,
                memorization_score(&b.text, reference),
            );
        }

        metrics
    }

    /// Compare two raw texts, deriving lexical token ids for each
    pub fn compare_texts(&self, a: &str, b: &str, reference: Option<&str>) -> MetricVector {
        self.compare(
            &GenerationSample::from_text(a),
            &GenerationSample::from_text(b),
            reference,
        )
    }
}
