//! Bonferroni multiple-comparison correction

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Raw and family-corrected view of one p-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectedPValue {
    pub raw: f64,
    /// min(raw * family_size, 1)
    pub corrected: f64,
    pub significant_uncorrected: bool,
    pub significant: bool,
}

/// Bonferroni correction for a caller-supplied family size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bonferroni {
    alpha: f64,
    family_size: usize,
}

impl Bonferroni {
    pub fn new(alpha: f64, family_size: usize) -> Result<Self, DomainError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(DomainError::configuration(format!(
                "alpha must be in (0, 1), got {}",
                alpha
            )));
        }
        if family_size == 0 {
            return Err(DomainError::configuration("family size must be at least 1"));
        }
        Ok(Self { alpha, family_size })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn family_size(&self) -> usize {
        self.family_size
    }

    /// alpha / family_size
    pub fn corrected_alpha(&self) -> f64 {
        self.alpha / self.family_size as f64
    }

    pub fn adjust(&self, p_value: f64) -> f64 {
        (p_value * self.family_size as f64).min(1.0)
    }

    pub fn correct(&self, p_value: f64) -> CorrectedPValue {
        CorrectedPValue {
            raw: p_value,
            corrected: self.adjust(p_value),
            significant_uncorrected: p_value < self.alpha,
            significant: p_value < self.corrected_alpha(),
        }
    }

    pub fn correct_all(&self, p_values: &[f64]) -> Vec<CorrectedPValue> {
        p_values.iter().map(|p| self.correct(*p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_of_ten() {
        let correction = Bonferroni::new(0.05, 10).unwrap();
        assert_eq!(correction.corrected_alpha(), 0.005);

        let result = correction.correct(0.01);
        assert!(result.significant_uncorrected);
        assert!(!result.significant);
        assert!((result.corrected - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_correct_all_preserves_order() {
        let p_values = [0.001, 0.01, 0.2, 0.0049, 0.3, 0.04, 0.5, 0.6, 0.7, 0.9];
        let correction = Bonferroni::new(0.05, p_values.len()).unwrap();
        let results = correction.correct_all(&p_values);

        assert_eq!(results.len(), 10);
        let significant: Vec<f64> = results
            .iter()
            .filter(|r| r.significant)
            .map(|r| r.raw)
            .collect();
        assert_eq!(significant, vec![0.001, 0.0049]);
        assert_eq!(results[9].corrected, 1.0);
    }

    #[test]
    fn test_family_of_one_is_uncorrected() {
        let correction = Bonferroni::new(0.05, 1).unwrap();
        let result = correction.correct(0.03);
        assert!(result.significant);
        assert_eq!(result.corrected, 0.03);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(Bonferroni::new(0.05, 0).unwrap_err().is_configuration());
        assert!(Bonferroni::new(0.0, 3).is_err());
        assert!(Bonferroni::new(1.0, 3).is_err());
        assert!(Bonferroni::new(f64::NAN, 3).is_err());
    }
}
