//! Attractor entity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::metrics::memorization_score;
use crate::domain::DomainError;

/// Memorization score above which a completion counts as reproducing the attractor
pub const DEFAULT_MEMORIZATION_THRESHOLD: f64 = 0.8;

/// Broad genre of an attractor text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttractorCategory {
    Literature,
    Legal,
    Speech,
    Religious,
    Poetry,
    Science,
}

impl AttractorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Literature => "literature",
            Self::Legal => "legal",
            Self::Speech => "speech",
            Self::Religious => "religious",
            Self::Poetry => "poetry",
            Self::Science => "science",
        }
    }
}

impl fmt::Display for AttractorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AttractorCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "literature" => Ok(Self::Literature),
            "legal" => Ok(Self::Legal),
            "speech" => Ok(Self::Speech),
            "religious" => Ok(Self::Religious),
            "poetry" => Ok(Self::Poetry),
            "science" => Ok(Self::Science),
            other => Err(DomainError::configuration(format!(
                "Unknown attractor category '{}'",
                other
            ))),
        }
    }
}

/// Expected strength of memorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttractorTier {
    /// Expected memorization above 0.95
    Tier1,
    /// Expected memorization above 0.90
    Tier2,
    /// Non-English texts with weaker guarantees
    Multilingual,
}

/// Preset groupings of attractors for experiment runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteSize {
    #[default]
    Minimal,
    Standard,
    Comprehensive,
}

impl FromStr for SuiteSize {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimal" => Ok(Self::Minimal),
            "standard" => Ok(Self::Standard),
            "comprehensive" => Ok(Self::Comprehensive),
            other => Err(DomainError::configuration(format!(
                "Unknown suite size '{}', expected minimal, standard or comprehensive",
                other
            ))),
        }
    }
}

/// A prompt whose continuation a model strongly favors, plus the text it is
/// expected to reproduce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attractor {
    pub id: String,
    /// Opening fragment sent to the model
    pub prompt: String,
    /// Full canonical passage used as the memorization reference
    pub canonical: String,
    pub language: String,
    pub source: String,
    pub category: AttractorCategory,
    pub tier: AttractorTier,
    pub expected_memorization: f64,
}

impl Attractor {
    pub fn new(
        id: impl Into<String>,
        prompt: impl Into<String>,
        canonical: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            canonical: canonical.into(),
            language: "en".to_string(),
            source: String::new(),
            category: AttractorCategory::Literature,
            tier: AttractorTier::Tier1,
            expected_memorization: 0.0,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_category(mut self, category: AttractorCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_tier(mut self, tier: AttractorTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_expected_memorization(mut self, expected: f64) -> Self {
        self.expected_memorization = expected;
        self
    }

    /// The part of the canonical passage that follows the prompt. Falls back
    /// to the whole passage when the prompt is not a prefix of it.
    pub fn continuation(&self) -> &str {
        self.canonical
            .strip_prefix(self.prompt.as_str())
            .map(str::trim)
            .unwrap_or(&self.canonical)
    }

    pub fn word_count(&self) -> usize {
        self.canonical.split_whitespace().count()
    }

    /// Score a completion against the canonical passage and decide whether
    /// it reproduces it
    pub fn check_memorization(&self, completion: &str, threshold: f64) -> (f64, bool) {
        let score = memorization_score(completion, &self.canonical);
        (score, score >= threshold)
    }
}
