//! Set, sequence and bag-of-tokens similarity over token-id streams

use std::collections::{HashMap, HashSet};

/// Jaccard overlap of the two token-id sets; 1.0 when both are empty
pub fn token_overlap(a: &[u32], b: &[u32]) -> f64 {
    let set_a: HashSet<u32> = a.iter().copied().collect();
    let set_b: HashSet<u32> = b.iter().copied().collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 1.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}

/// Levenshtein distance over any comparable sequence
pub fn edit_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, item) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, other) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(item != other);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Levenshtein distance divided by `max(len(a), len(b), 1)`, bounded to [0, 1]
pub fn normalized_edit_distance<T: PartialEq>(a: &[T], b: &[T]) -> f64 {
    let longest = a.len().max(b.len()).max(1);
    edit_distance(a, b) as f64 / longest as f64
}

/// Character-level normalized edit distance between two texts
pub fn text_edit_distance(a: &str, b: &str) -> f64 {
    let chars_a: Vec<char> = a.chars().collect();
    let chars_b: Vec<char> = b.chars().collect();
    normalized_edit_distance(&chars_a, &chars_b)
}

/// `1 - normalized_edit_distance`
pub fn stability_score(a: &str, b: &str) -> f64 {
    1.0 - text_edit_distance(a, b)
}

/// Cosine similarity of the bag-of-tokens count vectors.
///
/// Two zero vectors are identical (1.0); one zero vector shares nothing (0.0).
pub fn cosine_similarity(a: &[u32], b: &[u32]) -> f64 {
    let counts_a = bag_of_tokens(a);
    let counts_b = bag_of_tokens(b);

    match (counts_a.is_empty(), counts_b.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }

    let dot: f64 = counts_a
        .iter()
        .filter_map(|(token, count)| counts_b.get(token).map(|other| count * other))
        .sum();
    let norm_a = counts_a.values().map(|c| c * c).sum::<f64>().sqrt();
    let norm_b = counts_b.values().map(|c| c * c).sum::<f64>().sqrt();

    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

fn bag_of_tokens(tokens: &[u32]) -> HashMap<u32, f64> {
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(*token).or_insert(0.0) += 1.0;
    }
    counts
}
