//! Statistical functions for control vs modified comparisons
//!
//! Student's pooled-variance t-test is the default; Welch's variant is kept
//! for samples with clearly unequal variances. Distribution functions come
//! from `statrs`.

use statrs::distribution::{ContinuousCDF, FisherSnedecor, Normal, StudentsT};

use crate::domain::experiment::{AnovaResult, ConfidenceInterval};

/// t statistic, degrees of freedom and two-tailed p-value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TStatistic {
    pub t: f64,
    pub df: f64,
    pub p_value: f64,
}

/// Student's two-sample t-test with pooled variance
///
/// The statistic is for `mean(modified) - mean(control)`.
///
/// # Returns
/// * `Some(TStatistic)` if calculation succeeds
/// * `None` if either sample has fewer than 2 elements
///
/// Zero pooled variance gives t = 0, p = 1 for equal means and t = ±∞,
/// p = 0 otherwise.
pub fn student_t_test(control: &[f64], modified: &[f64]) -> Option<TStatistic> {
    if control.len() < 2 || modified.len() < 2 {
        return None;
    }

    let n1 = control.len() as f64;
    let n2 = modified.len() as f64;
    let df = n1 + n2 - 2.0;
    let difference = mean(modified) - mean(control);

    let se = pooled_std_dev(control, modified)? * (1.0 / n1 + 1.0 / n2).sqrt();
    if se == 0.0 {
        return Some(degenerate_statistic(difference, df));
    }

    let t = difference / se;
    Some(TStatistic {
        t,
        df,
        p_value: two_tailed_p_value(t, df)?,
    })
}

/// Welch's t-test for two independent samples
///
/// Preferred over Student's t-test when the two samples may have unequal
/// variances and/or unequal sample sizes.
pub fn welch_t_test(control: &[f64], modified: &[f64]) -> Option<TStatistic> {
    if control.len() < 2 || modified.len() < 2 {
        return None;
    }

    let n1 = control.len() as f64;
    let n2 = modified.len() as f64;
    let var1 = variance(control);
    let var2 = variance(modified);
    let difference = mean(modified) - mean(control);

    let se = ((var1 / n1) + (var2 / n2)).sqrt();
    if se == 0.0 {
        return Some(degenerate_statistic(difference, n1 + n2 - 2.0));
    }

    // Welch-Satterthwaite degrees of freedom
    let df_num = (var1 / n1 + var2 / n2).powi(2);
    let df_denom = ((var1 / n1).powi(2) / (n1 - 1.0)) + ((var2 / n2).powi(2) / (n2 - 1.0));
    let df = df_num / df_denom;

    let t = difference / se;
    Some(TStatistic {
        t,
        df,
        p_value: two_tailed_p_value(t, df)?,
    })
}

fn degenerate_statistic(difference: f64, df: f64) -> TStatistic {
    if difference == 0.0 {
        TStatistic {
            t: 0.0,
            df,
            p_value: 1.0,
        }
    } else {
        TStatistic {
            t: f64::INFINITY.copysign(difference),
            df,
            p_value: 0.0,
        }
    }
}

/// Two-tailed p-value of `t` under Student's t with `df` degrees of freedom
pub fn two_tailed_p_value(t: f64, df: f64) -> Option<f64> {
    let distribution = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * (1.0 - distribution.cdf(t.abs()))).clamp(0.0, 1.0))
}

/// Calculate mean of a sample
pub fn mean(sample: &[f64]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    sample.iter().sum::<f64>() / sample.len() as f64
}

/// Mean of a non-empty sample; None when there is nothing to average
pub fn checked_mean(sample: &[f64]) -> Option<f64> {
    (!sample.is_empty()).then(|| mean(sample))
}

/// Calculate variance of a sample (sample variance, n-1 denominator)
pub fn variance(sample: &[f64]) -> f64 {
    if sample.len() < 2 {
        return 0.0;
    }

    let m = mean(sample);
    let n = sample.len() as f64;
    sample.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1.0)
}

/// Calculate standard deviation of a sample
pub fn std_dev(sample: &[f64]) -> f64 {
    variance(sample).sqrt()
}

/// Pooled standard deviation of two samples; None below two observations each
pub fn pooled_std_dev(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }

    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let pooled = ((n1 - 1.0) * variance(a) + (n2 - 1.0) * variance(b)) / (n1 + n2 - 2.0);
    Some(pooled.sqrt())
}

/// Cohen's d for `mean(modified) - mean(control)` using the pooled standard
/// deviation. None when it is undefined (too few samples or zero spread).
pub fn cohens_d(control: &[f64], modified: &[f64]) -> Option<f64> {
    let pooled = pooled_std_dev(control, modified)?;
    if pooled == 0.0 {
        return None;
    }
    Some((mean(modified) - mean(control)) / pooled)
}

/// Parametric t-based confidence interval of a sample mean
pub fn mean_confidence_interval(sample: &[f64], level: f64) -> Option<ConfidenceInterval> {
    if sample.len() < 2 || !(0.0..1.0).contains(&level) {
        return None;
    }

    let n = sample.len() as f64;
    let m = mean(sample);
    let se = std_dev(sample) / n.sqrt();
    let distribution = StudentsT::new(0.0, 1.0, n - 1.0).ok()?;
    let critical = distribution.inverse_cdf(1.0 - (1.0 - level) / 2.0);

    Some(ConfidenceInterval::new(
        m - critical * se,
        m + critical * se,
        level,
    ))
}

/// One-way ANOVA across groups, with eta squared as the effect size
///
/// Needs at least two groups, every group non-empty, and more observations
/// than groups.
pub fn one_way_anova(groups: &[&[f64]], alpha: f64) -> Option<AnovaResult> {
    let k = groups.len();
    let n: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 || n <= k || groups.iter().any(|g| g.is_empty()) {
        return None;
    }

    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n as f64;

    let ss_between: f64 = groups
        .iter()
        .map(|g| g.len() as f64 * (mean(g) - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .map(|g| {
            let m = mean(g);
            g.iter().map(|x| (x - m).powi(2)).sum::<f64>()
        })
        .sum();
    let ss_total = ss_between + ss_within;

    let df_between = (k - 1) as f64;
    let df_within = (n - k) as f64;

    let (f_statistic, p_value) = if ss_within == 0.0 {
        if ss_between == 0.0 {
            (0.0, 1.0)
        } else {
            (f64::INFINITY, 0.0)
        }
    } else {
        let f = (ss_between / df_between) / (ss_within / df_within);
        let distribution = FisherSnedecor::new(df_between, df_within).ok()?;
        (f, (1.0 - distribution.cdf(f)).clamp(0.0, 1.0))
    };

    let eta_squared = if ss_total == 0.0 {
        0.0
    } else {
        ss_between / ss_total
    };

    Some(AnovaResult {
        f_statistic,
        p_value,
        df_between,
        df_within,
        eta_squared,
        significant: p_value < alpha,
    })
}

/// Per-group sample size needed to detect `effect_size` (Cohen's d) with a
/// two-sided test at `alpha` and the given `power` (normal approximation)
pub fn required_sample_size(effect_size: f64, alpha: f64, power: f64) -> Option<usize> {
    let effect_size = effect_size.abs();
    if effect_size == 0.0 || !effect_size.is_finite() {
        return None;
    }
    if !(0.0..1.0).contains(&alpha) || !(0.0..1.0).contains(&power) || alpha == 0.0 {
        return None;
    }

    let normal = Normal::new(0.0, 1.0).ok()?;
    let z_alpha = normal.inverse_cdf(1.0 - alpha / 2.0);
    let z_beta = normal.inverse_cdf(power);

    let n = 2.0 * ((z_alpha + z_beta) / effect_size).powi(2);
    Some(n.ceil() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTROL: [f64; 5] = [0.10, 0.12, 0.11, 0.13, 0.09];
    const MODIFIED: [f64; 5] = [0.05, 0.06, 0.04, 0.07, 0.05];

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[42.0]), 42.0);
    }

    #[test]
    fn test_checked_mean() {
        assert_eq!(checked_mean(&[]), None);
        assert_eq!(checked_mean(&[1.0, 3.0]), Some(2.0));
    }

    #[test]
    fn test_variance() {
        // Variance of [1, 2, 3, 4, 5] = 2.5 (sample variance)
        let var = variance(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((var - 2.5).abs() < 0.001);

        assert_eq!(variance(&[]), 0.0);
        assert_eq!(variance(&[42.0]), 0.0);
    }

    #[test]
    fn test_std_dev() {
        let sd = std_dev(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((sd - 1.5811).abs() < 0.001);
    }

    mod t_test_tests {
        use super::*;

        #[test]
        fn test_insufficient_samples() {
            assert!(student_t_test(&[], &[1.0, 2.0]).is_none());
            assert!(student_t_test(&[1.0], &[1.0, 2.0]).is_none());
            assert!(welch_t_test(&[1.0, 2.0], &[1.0]).is_none());
        }

        #[test]
        fn test_large_difference() {
            let stat = student_t_test(&CONTROL, &MODIFIED).unwrap();

            assert!((stat.t + 6.4236).abs() < 1e-3, "t = {}", stat.t);
            assert_eq!(stat.df, 8.0);
            assert!(stat.p_value < 0.01, "p = {}", stat.p_value);
        }

        #[test]
        fn test_identical_samples() {
            let sample = [1.0, 2.0, 3.0, 4.0, 5.0];
            let stat = student_t_test(&sample, &sample).unwrap();

            assert_eq!(stat.t, 0.0);
            assert!((stat.p_value - 1.0).abs() < 1e-9);
        }

        #[test]
        fn test_zero_variance() {
            let same = student_t_test(&[2.0, 2.0], &[2.0, 2.0, 2.0]).unwrap();
            assert_eq!(same.p_value, 1.0);

            let shifted = student_t_test(&[2.0, 2.0], &[3.0, 3.0]).unwrap();
            assert_eq!(shifted.t, f64::INFINITY);
            assert_eq!(shifted.p_value, 0.0);
        }

        #[test]
        fn test_welch_similar_samples() {
            let control = [100.0, 102.0, 98.0, 101.0, 99.0];
            let modified = [101.0, 99.0, 100.0, 102.0, 98.0];

            let stat = welch_t_test(&control, &modified).unwrap();
            assert!(stat.p_value > 0.5, "p = {}", stat.p_value);
        }

        #[test]
        fn test_welch_different_samples() {
            let control = [100.0, 102.0, 98.0, 101.0, 99.0, 100.0, 101.0, 99.0];
            let modified = [150.0, 152.0, 148.0, 151.0, 149.0, 150.0, 151.0, 149.0];

            let stat = welch_t_test(&control, &modified).unwrap();
            assert!(stat.t > 0.0);
            assert!(stat.p_value < 0.01);
        }

        #[test]
        fn test_p_value_known_point() {
            // t = 2.306 is the 97.5th percentile for df = 8
            let p = two_tailed_p_value(2.306, 8.0).unwrap();
            assert!((p - 0.05).abs() < 1e-3, "p = {}", p);
        }
    }

    mod effect_size_tests {
        use super::*;

        #[test]
        fn test_cohens_d_large_effect() {
            let d = cohens_d(&CONTROL, &MODIFIED).unwrap();
            assert!(d < -2.9, "d = {}", d);
            assert!((d + 4.0627).abs() < 1e-3);
        }

        #[test]
        fn test_cohens_d_undefined() {
            assert!(cohens_d(&[1.0], &[2.0, 3.0]).is_none());
            assert!(cohens_d(&[1.0, 1.0], &[2.0, 2.0]).is_none());
        }

        #[test]
        fn test_required_sample_size() {
            // d = 0.5, alpha = 0.05, power = 0.8 -> about 63 per group
            assert_eq!(required_sample_size(0.5, 0.05, 0.8), Some(63));
            assert!(required_sample_size(0.0, 0.05, 0.8).is_none());
            assert!(required_sample_size(0.5, 1.5, 0.8).is_none());
        }
    }

    mod interval_tests {
        use super::*;

        #[test]
        fn test_mean_confidence_interval() {
            let ci = mean_confidence_interval(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.95).unwrap();

            // 3 ± 2.776 * 1.5811 / sqrt(5)
            assert!((ci.lower - 1.0368).abs() < 1e-3);
            assert!((ci.upper - 4.9632).abs() < 1e-3);
            assert!(mean_confidence_interval(&[1.0], 0.95).is_none());
        }
    }

    mod anova_tests {
        use super::*;

        #[test]
        fn test_separated_groups() {
            let a = [1.0, 2.0, 3.0];
            let b = [10.0, 11.0, 12.0];
            let c = [20.0, 21.0, 22.0];

            let result = one_way_anova(&[&a[..], &b[..], &c[..]], 0.05).unwrap();
            assert!(result.significant);
            assert!(result.eta_squared > 0.9);
            assert_eq!(result.df_between, 2.0);
            assert_eq!(result.df_within, 6.0);
        }

        #[test]
        fn test_identical_groups() {
            let a = [1.0, 2.0, 3.0];
            let result = one_way_anova(&[&a[..], &a[..]], 0.05).unwrap();

            assert_eq!(result.f_statistic, 0.0);
            assert!(!result.significant);
            assert_eq!(result.eta_squared, 0.0);
        }

        #[test]
        fn test_invalid_groups() {
            assert!(one_way_anova(&[&[1.0, 2.0][..]], 0.05).is_none());
            assert!(one_way_anova(&[&[1.0][..], &[2.0][..]], 0.05).is_none());
        }
    }
}
