//! Seeded percentile bootstrap of a difference of means

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::domain::experiment::ConfidenceInterval;

/// Resamples drawn per interval
pub const BOOTSTRAP_RESAMPLES: usize = 10_000;

/// Seed used when the caller does not supply one
pub const BOOTSTRAP_SEED: u64 = 42;

/// Confidence level of the percentile interval (2.5th to 97.5th percentile)
pub const BOOTSTRAP_LEVEL: f64 = 0.95;

/// Percentile bootstrap driven by a seeded ChaCha8 stream, so identical
/// inputs and seed always yield bit-identical bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bootstrap {
    resamples: usize,
    seed: u64,
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::new(BOOTSTRAP_RESAMPLES, BOOTSTRAP_SEED)
    }
}

impl Bootstrap {
    pub fn new(resamples: usize, seed: u64) -> Self {
        Self {
            resamples: resamples.max(1),
            seed,
        }
    }

    pub fn resamples(&self) -> usize {
        self.resamples
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// CI of `mean(modified) - mean(control)`, resampling each group
    /// independently. None when either group is empty.
    pub fn difference_ci(&self, control: &[f64], modified: &[f64]) -> Option<ConfidenceInterval> {
        if control.is_empty() || modified.is_empty() {
            return None;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut estimates: Vec<f64> = (0..self.resamples)
            .map(|_| resample_mean(&mut rng, modified) - resample_mean(&mut rng, control))
            .collect();

        Some(percentile_interval(&mut estimates))
    }
}

fn resample_mean(rng: &mut ChaCha8Rng, sample: &[f64]) -> f64 {
    let n = sample.len();
    let total: f64 = (0..n).map(|_| sample[rng.gen_range(0..n)]).sum();
    total / n as f64
}

fn percentile_interval(estimates: &mut [f64]) -> ConfidenceInterval {
    estimates.sort_by(f64::total_cmp);
    let tail = (1.0 - BOOTSTRAP_LEVEL) / 2.0 * 100.0;
    ConfidenceInterval::new(
        percentile(estimates, tail),
        percentile(estimates, 100.0 - tail),
        BOOTSTRAP_LEVEL,
    )
}

/// Percentile of sorted data with linear interpolation between ranks
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => return f64::NAN,
        1 => return sorted[0],
        _ => {}
    }

    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let low = rank.floor() as usize;
    let high = rank.ceil() as usize;
    let fraction = rank - low as f64;
    sorted[low] + (sorted[high] - sorted[low]) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::experiment::statistical::mean;

    const CONTROL: [f64; 5] = [0.10, 0.12, 0.11, 0.13, 0.09];
    const MODIFIED: [f64; 5] = [0.05, 0.06, 0.04, 0.07, 0.05];

    #[test]
    fn test_percentile_interpolates() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&data, 50.0), 3.0);
        assert_eq!(percentile(&data, 0.0), 1.0);
        assert_eq!(percentile(&data, 100.0), 5.0);
        assert!((percentile(&data, 2.5) - 1.1).abs() < 1e-12);
        assert_eq!(percentile(&[7.0], 97.5), 7.0);
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let bootstrap = Bootstrap::default();
        let first = bootstrap.difference_ci(&CONTROL, &MODIFIED).unwrap();
        let second = bootstrap.difference_ci(&CONTROL, &MODIFIED).unwrap();

        assert_eq!(first.lower.to_bits(), second.lower.to_bits());
        assert_eq!(first.upper.to_bits(), second.upper.to_bits());
    }

    #[test]
    fn test_different_seed_changes_bounds() {
        let a = Bootstrap::new(2_000, 1).difference_ci(&CONTROL, &MODIFIED).unwrap();
        let b = Bootstrap::new(2_000, 2).difference_ci(&CONTROL, &MODIFIED).unwrap();
        assert_ne!((a.lower, a.upper), (b.lower, b.upper));
    }

    #[test]
    fn test_difference_interval_excludes_zero_for_large_effect() {
        let ci = Bootstrap::default().difference_ci(&CONTROL, &MODIFIED).unwrap();
        let delta = mean(&MODIFIED) - mean(&CONTROL);

        assert!(ci.upper < 0.0);
        assert!(ci.contains(delta));
        assert_eq!(ci.level, 0.95);
    }

    #[test]
    fn test_constant_samples_collapse() {
        let ci = Bootstrap::new(500, 7)
            .difference_ci(&[0.5, 0.5, 0.5], &[0.75, 0.75])
            .unwrap();
        assert_eq!(ci.lower, 0.25);
        assert_eq!(ci.upper, 0.25);
    }

    #[test]
    fn test_empty_groups() {
        assert!(Bootstrap::default().difference_ci(&[], &MODIFIED).is_none());
        assert!(Bootstrap::default().difference_ci(&CONTROL, &[]).is_none());
    }

    #[test]
    fn test_resamples_floor() {
        assert_eq!(Bootstrap::new(0, 1).resamples(), 1);
    }
}
