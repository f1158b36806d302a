//! Fixed vocabularies used by the token and embedding actions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Out-of-distribution marker tokens
pub const RARE_TOKENS: &[&str] = &[
    "∮", "⊗", "∇", "≈", "∞", "⊕", "⊖", "⊙", "<ISO-2847>", "<X2F-ERROR>", "<ANOMALY>",
    "⟨quantum⟩", "⟨void⟩", "⟨glitch⟩",
];

/// Default marker inserted by `TokenInsertion`
pub const DEFAULT_INSERTION_TOKEN: &str = "<ISO-2847>";

/// Default marker injected by `MidSequenceShock`
pub const DEFAULT_SHOCK_TOKEN: &str = "<X2F-ERROR>";

/// Default rare symbol used by `TokenSubstitution`
pub const DEFAULT_SUBSTITUTION_TOKEN: &str = "∮";

/// Semantically unrelated words appended by the isotropic embedding perturbation
pub const NOISE_WORDS: &[&str] = &[
    "quantum",
    "recursive",
    "asymptotic",
    "stochastic",
    "ephemeral",
    "liminal",
    "fractal",
    "entropic",
];

/// Direction in style space used to simulate an embedding shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleDirection {
    Technical,
    Poetic,
    Modern,
    Archaic,
    Casual,
    Formal,
}

impl StyleDirection {
    pub const ALL: [StyleDirection; 6] = [
        Self::Technical,
        Self::Poetic,
        Self::Modern,
        Self::Archaic,
        Self::Casual,
        Self::Formal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Poetic => "poetic",
            Self::Modern => "modern",
            Self::Archaic => "archaic",
            Self::Casual => "casual",
            Self::Formal => "formal",
        }
    }

    /// Rewrite instruction that pushes the continuation along this direction
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Technical => "Rewrite in highly technical, scientific language:",
            Self::Poetic => "Rewrite in poetic, lyrical language:",
            Self::Modern => "Rewrite in modern, contemporary language:",
            Self::Archaic => "Rewrite in archaic, old-fashioned language:",
            Self::Casual => "Rewrite in casual, informal language:",
            Self::Formal => "Rewrite in formal, academic language:",
        }
    }
}

impl fmt::Display for StyleDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain of an out-of-domain segment shock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShockDomain {
    Technical,
    Modern,
    Absurd,
}

impl ShockDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Modern => "modern",
            Self::Absurd => "absurd",
        }
    }

    pub fn segments(&self) -> &'static [&'static str] {
        match self {
            Self::Technical => &[
                "according to ISO-9001 specifications",
                "via quantum entanglement protocols",
                "through recursive neural pathways",
                "using Bayesian inference methods",
            ],
            Self::Modern => &[
                "in the metaverse",
                "through blockchain consensus",
                "via neural network optimization",
                "using machine learning algorithms",
            ],
            Self::Absurd => &[
                "with interdimensional portals",
                "through time-reversed causality",
                "via telepathic resonance",
                "using antimatter propulsion",
            ],
        }
    }

    /// The phrase inserted by a segment shock of this domain
    pub fn primary_segment(&self) -> &'static str {
        self.segments()[0]
    }
}

impl fmt::Display for ShockDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
