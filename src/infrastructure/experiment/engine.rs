//! Statistical comparison engine
//!
//! Pure function of its inputs: the only randomness is the seeded bootstrap,
//! so repeated calls on the same data produce identical reports.

use tracing::debug;

use super::bootstrap::{Bootstrap, BOOTSTRAP_LEVEL};
use super::correction::Bonferroni;
use super::statistical::{
    checked_mean, cohens_d, mean_confidence_interval, required_sample_size, student_t_test,
    welch_t_test, TStatistic,
};
use crate::domain::experiment::{ComparisonReport, EffectMagnitude, TTestResult, TARGET_POWER};
use crate::domain::metrics::MetricName;
use crate::domain::DomainError;

/// Observations each condition needs before a variance can be estimated
pub const MIN_SAMPLES_PER_CONDITION: usize = 2;

/// Default significance level
pub const DEFAULT_ALPHA: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticalEngine {
    alpha: f64,
    bootstrap: Bootstrap,
}

impl Default for StatisticalEngine {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            bootstrap: Bootstrap::default(),
        }
    }
}

impl StatisticalEngine {
    pub fn new(alpha: f64, bootstrap: Bootstrap) -> Result<Self, DomainError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(DomainError::configuration(format!(
                "alpha must be in (0, 1), got {}",
                alpha
            )));
        }
        Ok(Self { alpha, bootstrap })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    /// Student's pooled-variance t-test of modified against control.
    ///
    /// Fails with `InsufficientSample` when either condition has fewer than
    /// two observations; no p-value is ever fabricated for that case.
    pub fn independent_ttest(
        &self,
        control: &[f64],
        modified: &[f64],
    ) -> Result<TTestResult, DomainError> {
        let statistic = student_t_test(control, modified)
            .ok_or_else(|| insufficient(control, modified))?;
        self.build_result(statistic, control, modified)
    }

    /// Welch's unequal-variance t-test of modified against control
    pub fn welch_ttest(
        &self,
        control: &[f64],
        modified: &[f64],
    ) -> Result<TTestResult, DomainError> {
        let statistic =
            welch_t_test(control, modified).ok_or_else(|| insufficient(control, modified))?;
        self.build_result(statistic, control, modified)
    }

    fn build_result(
        &self,
        statistic: TStatistic,
        control: &[f64],
        modified: &[f64],
    ) -> Result<TTestResult, DomainError> {
        let ci_95 = self
            .bootstrap
            .difference_ci(control, modified)
            .ok_or_else(|| insufficient(control, modified))?;

        Ok(TTestResult {
            t_statistic: statistic.t,
            degrees_of_freedom: statistic.df,
            p_value: statistic.p_value,
            cohens_d: cohens_d(control, modified),
            ci_95,
            significant: statistic.p_value < self.alpha,
        })
    }

    /// Compare one metric across conditions within a family of
    /// `family_size` comparisons.
    ///
    /// With fewer than two observations in either condition the report is
    /// marked undefined: no p-value and never significant. A condition with
    /// no observations has no mean and the report has no delta.
    pub fn compare(
        &self,
        metric: MetricName,
        control: &[f64],
        modified: &[f64],
        family_size: usize,
    ) -> Result<ComparisonReport, DomainError> {
        let correction = Bonferroni::new(self.alpha, family_size)?;

        let mut report =
            ComparisonReport::undefined(metric, control.len(), modified.len(), self.alpha, family_size)
                .with_means(checked_mean(control), checked_mean(modified));
        report.control_ci = mean_confidence_interval(control, BOOTSTRAP_LEVEL);
        report.modified_ci = mean_confidence_interval(modified, BOOTSTRAP_LEVEL);

        let test = match self.independent_ttest(control, modified) {
            Ok(test) => test,
            Err(err) if err.is_insufficient_sample() => {
                debug!(metric = %metric, error = %err, "Comparison undefined");
                return Ok(report);
            }
            Err(err) => return Err(err),
        };

        let corrected = correction.correct(test.p_value);

        report.undefined = false;
        report.ci_low = Some(test.ci_95.lower);
        report.ci_high = Some(test.ci_95.upper);
        report.t_statistic = Some(test.t_statistic);
        report.p_value = Some(test.p_value);
        report.p_value_corrected = Some(corrected.corrected);
        report.cohens_d = test.cohens_d;
        report.effect = test.cohens_d.map(EffectMagnitude::from_cohens_d);
        report.significant_uncorrected = corrected.significant_uncorrected;
        report.significant = corrected.significant;

        if !corrected.significant {
            report.required_n = test.cohens_d.and_then(|d| {
                required_sample_size(d, correction.corrected_alpha(), TARGET_POWER)
            });
        }

        Ok(report)
    }
}

fn insufficient(control: &[f64], modified: &[f64]) -> DomainError {
    DomainError::insufficient_sample(MIN_SAMPLES_PER_CONDITION, control.len(), modified.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTROL: [f64; 5] = [0.10, 0.12, 0.11, 0.13, 0.09];
    const MODIFIED: [f64; 5] = [0.05, 0.06, 0.04, 0.07, 0.05];

    fn engine() -> StatisticalEngine {
        StatisticalEngine::default()
    }

    mod ttest_tests {
        use super::*;

        #[test]
        fn test_large_effect_is_significant() {
            let result = engine().independent_ttest(&CONTROL, &MODIFIED).unwrap();

            let d = result.cohens_d.unwrap();
            assert!(d.abs() > 2.9, "d = {}", d);
            assert_eq!(EffectMagnitude::from_cohens_d(d), EffectMagnitude::Large);
            assert!(result.p_value < 0.01);
            assert!(result.significant);
            assert!(result.ci_95.upper < 0.0);
        }

        #[test]
        fn test_single_observation_is_undefined() {
            let err = engine().independent_ttest(&[0.1], &[0.2]).unwrap_err();

            assert!(err.is_insufficient_sample());
            assert_eq!(err, DomainError::insufficient_sample(2, 1, 1));
        }

        #[test]
        fn test_welch_insufficient() {
            assert!(engine()
                .welch_ttest(&[0.1, 0.2], &[])
                .unwrap_err()
                .is_insufficient_sample());
        }

        #[test]
        fn test_zero_variance_has_undefined_effect_size() {
            let result = engine()
                .independent_ttest(&[1.0, 1.0, 1.0], &[1.0, 1.0])
                .unwrap();

            assert!(result.cohens_d.is_none());
            assert_eq!(result.p_value, 1.0);
            assert!(!result.significant);
        }

        #[test]
        fn test_inputs_untouched_and_repeatable() {
            let control = CONTROL.to_vec();
            let modified = MODIFIED.to_vec();

            let first = engine().independent_ttest(&control, &modified).unwrap();
            let second = engine().independent_ttest(&control, &modified).unwrap();

            assert_eq!(first, second);
            assert_eq!(control, CONTROL.to_vec());
            assert_eq!(modified, MODIFIED.to_vec());
        }
    }

    mod compare_tests {
        use super::*;

        #[test]
        fn test_report_fields() {
            let report = engine()
                .compare(MetricName::ExactMatch, &CONTROL, &MODIFIED, 1)
                .unwrap();

            assert!(!report.undefined);
            assert!((report.mean_control.unwrap() - 0.11).abs() < 1e-12);
            assert!((report.mean_modified.unwrap() - 0.054).abs() < 1e-12);
            let delta = report.delta.unwrap();
            assert!((delta + 0.056).abs() < 1e-12);
            assert!(report.ci_low.unwrap() <= delta);
            assert!(report.ci_high.unwrap() >= delta);
            assert_eq!(report.p_value, report.p_value_corrected);
            assert_eq!(report.effect, Some(EffectMagnitude::Large));
            assert!(report.significant);
            assert_eq!(report.required_n, None);

            let control_ci = report.control_ci.unwrap();
            let modified_ci = report.modified_ci.unwrap();
            assert!(control_ci.contains(0.11));
            assert!(modified_ci.contains(0.054));
            assert!(modified_ci.upper < control_ci.lower);
        }

        #[test]
        fn test_n_equals_one_is_marked_undefined() {
            let report = engine()
                .compare(MetricName::KlDivergence, &[0.3], &[0.9], 5)
                .unwrap();

            assert!(report.undefined);
            assert!(report.p_value.is_none());
            assert!(report.p_value_corrected.is_none());
            assert!(!report.significant);
            assert!(!report.significant_uncorrected);
            assert!((report.delta.unwrap() - 0.6).abs() < 1e-12);
            assert!(report.control_ci.is_none());
        }

        #[test]
        fn test_empty_condition_has_no_mean() {
            let report = engine()
                .compare(MetricName::Memorization, &[0.9, 0.9, 0.9], &[], 1)
                .unwrap();

            assert!(report.undefined);
            assert_eq!(report.n_modified, 0);
            assert_eq!(report.mean_modified, None);
            assert_eq!(report.delta, None);
            assert!((report.mean_control.unwrap() - 0.9).abs() < 1e-12);
            assert!(report.modified_ci.is_none());
        }

        #[test]
        fn test_not_significant_reports_required_n() {
            let control = [0.50, 0.55, 0.45, 0.52, 0.48];
            let modified = [0.52, 0.57, 0.47, 0.53, 0.50];

            let report = engine()
                .compare(MetricName::TokenOverlap, &control, &modified, 1)
                .unwrap();

            assert!(!report.significant);
            let d = report.cohens_d.unwrap();
            assert_eq!(
                report.required_n,
                required_sample_size(d, DEFAULT_ALPHA, TARGET_POWER)
            );
            assert!(report.required_n.unwrap() > control.len());
            assert!(report.interpretation().contains("80% power"));
        }

        #[test]
        fn test_correction_can_remove_significance() {
            let control = [0.50, 0.52, 0.48, 0.51, 0.49, 0.50];
            let modified = [0.53, 0.54, 0.50, 0.53, 0.52, 0.52];

            let single = engine()
                .compare(MetricName::TokenOverlap, &control, &modified, 1)
                .unwrap();
            let family = engine()
                .compare(MetricName::TokenOverlap, &control, &modified, 1_000)
                .unwrap();

            assert!(single.significant);
            assert!(family.significant_uncorrected);
            assert!(!family.significant);
            assert_eq!(family.p_value_corrected, Some(1.0));
        }

        #[test]
        fn test_zero_family_size_rejected() {
            let err = engine()
                .compare(MetricName::ExactMatch, &CONTROL, &MODIFIED, 0)
                .unwrap_err();
            assert!(err.is_configuration());
        }

        #[test]
        fn test_invalid_alpha_rejected() {
            assert!(StatisticalEngine::new(1.5, Bootstrap::default()).is_err());
        }
    }
}
