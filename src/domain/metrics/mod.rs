//! Divergence metrics suite
//!
//! Every metric is total: empty or degenerate inputs return a documented
//! value instead of NaN or an error.

mod distribution;
mod lexical;
mod suite;
mod text;
mod trajectory;

pub use distribution::{js_divergence, kl_divergence, smoothed_distributions, LAPLACE_SMOOTHING};
pub use lexical::{
    cosine_similarity, edit_distance, normalized_edit_distance, stability_score,
    text_edit_distance, token_overlap,
};
pub use suite::{DivergenceSuite, MetricName, MetricVector};
pub use text::{exact_match, lcs_length, memorization_score, normalize, prefix_match_words};
pub use trajectory::{
    divergence_point, relative_divergence, replicate_stability, structural_similarity,
    NO_DIVERGENCE,
};
