//! Unigram distribution divergences with additive smoothing

use std::collections::{BTreeSet, HashMap};

/// Additive (Laplace) pseudo-count applied to every vocabulary entry
pub const LAPLACE_SMOOTHING: f64 = 1.0;

/// Smoothed unigram distributions of `a` and `b` over their joint vocabulary.
///
/// Both vectors are indexed by the same sorted vocabulary and each sums to 1.
/// Empty when neither stream has any tokens.
pub fn smoothed_distributions(a: &[u32], b: &[u32]) -> (Vec<f64>, Vec<f64>) {
    let vocabulary: BTreeSet<u32> = a.iter().chain(b.iter()).copied().collect();
    let counts_a = unigram_counts(a);
    let counts_b = unigram_counts(b);

    let build = |counts: &HashMap<u32, usize>, total: usize| -> Vec<f64> {
        let denominator = total as f64 + LAPLACE_SMOOTHING * vocabulary.len() as f64;
        vocabulary
            .iter()
            .map(|token| {
                let count = counts.get(token).copied().unwrap_or(0) as f64;
                (count + LAPLACE_SMOOTHING) / denominator
            })
            .collect()
    };

    (build(&counts_a, a.len()), build(&counts_b, b.len()))
}

/// KL(A || B) in nats over smoothed unigram distributions; always >= 0
pub fn kl_divergence(a: &[u32], b: &[u32]) -> f64 {
    let (p, q) = smoothed_distributions(a, b);
    relative_entropy(&p, &q)
}

/// Jensen-Shannon divergence in nats, bounded by ln 2
pub fn js_divergence(a: &[u32], b: &[u32]) -> f64 {
    let (p, q) = smoothed_distributions(a, b);
    let m: Vec<f64> = p.iter().zip(&q).map(|(x, y)| 0.5 * (x + y)).collect();
    let js = 0.5 * relative_entropy(&p, &m) + 0.5 * relative_entropy(&q, &m);
    js.clamp(0.0, std::f64::consts::LN_2)
}

fn relative_entropy(p: &[f64], q: &[f64]) -> f64 {
    let sum: f64 = p
        .iter()
        .zip(q)
        .filter(|(x, _)| **x > 0.0)
        .map(|(x, y)| x * (x / y).ln())
        .sum();
    sum.max(0.0)
}

fn unigram_counts(tokens: &[u32]) -> HashMap<u32, usize> {
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(*token).or_insert(0) += 1;
    }
    counts
}
