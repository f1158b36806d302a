//! Text-level metrics: exact match, prefix match and memorization

use once_cell::sync::Lazy;
use regex::Regex;

static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{P}\p{S}]").expect("punctuation pattern is valid"));

/// Case-fold, drop punctuation and collapse whitespace
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lowered, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 1.0 when both texts normalize to the same string, else 0.0
pub fn exact_match(a: &str, b: &str) -> f64 {
    if normalize(a) == normalize(b) {
        1.0
    } else {
        0.0
    }
}

/// Number of leading whitespace-delimited words the two texts share
pub fn prefix_match_words(a: &str, b: &str) -> usize {
    a.split_whitespace()
        .zip(b.split_whitespace())
        .take_while(|(left, right)| left == right)
        .count()
}

/// Length of the longest common subsequence of two sequences
pub fn lcs_length<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for item in a {
        for (j, other) in b.iter().enumerate() {
            current[j + 1] = if item == other {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Word-level LCS between `generated` and `reference`, normalized by the
/// reference word count and clamped to [0, 1]. An empty reference scores 0.
pub fn memorization_score(generated: &str, reference: &str) -> f64 {
    let reference_norm = normalize(reference);
    let reference_words: Vec<&str> = reference_norm.split_whitespace().collect();
    if reference_words.is_empty() {
        return 0.0;
    }

    let generated_norm = normalize(generated);
    let generated_words: Vec<&str> = generated_norm.split_whitespace().collect();

    let common = lcs_length(&generated_words, &reference_words) as f64;
    (common / reference_words.len() as f64).clamp(0.0, 1.0)
}
