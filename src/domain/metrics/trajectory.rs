//! Trajectory metrics: where two outputs part ways and how their layout compares

use super::lexical::token_overlap;
use super::text::lcs_length;
use crate::domain::generation::lexical_token_ids;

/// Sentinel returned by [`divergence_point`] when the sequences never differ
pub const NO_DIVERGENCE: i64 = -1;

const STRUCTURAL_MARKS: &[char] = &['\n', '.', ',', ';', ':', '!', '?'];

/// Index of the first position where `a` and `b` differ.
///
/// Equal sequences yield [`NO_DIVERGENCE`]. When one sequence is a strict
/// prefix of the other the divergence is at the shorter length, the first
/// position only one of them has.
pub fn divergence_point<T: PartialEq>(a: &[T], b: &[T]) -> i64 {
    match a.iter().zip(b).position(|(left, right)| left != right) {
        Some(index) => index as i64,
        None if a.len() == b.len() => NO_DIVERGENCE,
        None => a.len().min(b.len()) as i64,
    }
}

/// Share of the longer sequence that precedes the first difference, in
/// [0, 1]. Sequences that never differ score 1.0, so larger always means the
/// two outputs stayed together longer.
pub fn relative_divergence<T: PartialEq>(a: &[T], b: &[T]) -> f64 {
    match divergence_point(a, b) {
        NO_DIVERGENCE => 1.0,
        index => index as f64 / a.len().max(b.len()) as f64,
    }
}

/// Similarity of the line-break and punctuation skeletons of two texts,
/// as `2 * LCS / (|A| + |B|)`. Two texts without structure are identical.
pub fn structural_similarity(a: &str, b: &str) -> f64 {
    let marks_a = structural_marks(a);
    let marks_b = structural_marks(b);

    let total = marks_a.len() + marks_b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * lcs_length(&marks_a, &marks_b) as f64 / total as f64
}

fn structural_marks(text: &str) -> Vec<char> {
    text.chars().filter(|c| STRUCTURAL_MARKS.contains(c)).collect()
}

/// Stability of repeated generations against a reference: mean token overlap
/// scaled down by the (population) variance of the overlaps.
pub fn replicate_stability<S: AsRef<str>>(responses: &[S], reference: &str) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }

    let reference_ids = lexical_token_ids(reference);
    let overlaps: Vec<f64> = responses
        .iter()
        .map(|response| token_overlap(&lexical_token_ids(response.as_ref()), &reference_ids))
        .collect();

    let n = overlaps.len() as f64;
    let mean = overlaps.iter().sum::<f64>() / n;
    let variance = overlaps.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

    mean * (1.0 - variance.min(1.0))
}
