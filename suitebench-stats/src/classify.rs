//! Regression/Improvement Classification
//!
//! Compares a completed benchmark's rate against its baseline rate.
//!
//! The two percentages deliberately use different denominators:
//!
//! ```text
//! regression  = (previous - hz) / previous * 100
//! improvement = (hz - previous) / hz       * 100
//! ```
//!
//! Both are rounded to three decimals before being compared against the
//! error margin.

use serde::{Deserialize, Serialize};

/// Default error margin, in percent
pub const DEFAULT_ERROR_MARGIN: f64 = 2.5;

/// Rate change relative to the baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    /// Absolute change in operations per second
    pub difference: f64,
    /// Change in percent, rounded to three decimals
    pub percentage_difference: f64,
}

/// Outcome of comparing a rate with its baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum Classification {
    /// Slower than the baseline by at least the error margin
    Regression(Delta),
    /// Faster than the baseline by at least the error margin
    Improvement(Delta),
    /// Within the error margin
    Unchanged,
    /// No usable baseline
    NoBaseline,
}

impl Classification {
    /// Whether this is a regression
    pub fn is_regression(&self) -> bool {
        matches!(self, Classification::Regression(_))
    }

    /// Whether this is an improvement
    pub fn is_improvement(&self) -> bool {
        matches!(self, Classification::Improvement(_))
    }

    /// The rate change, if it crossed the error margin
    pub fn delta(&self) -> Option<&Delta> {
        match self {
            Classification::Regression(d) | Classification::Improvement(d) => Some(d),
            _ => None,
        }
    }
}

/// Round to three decimal places
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Classifies rates against baselines with a fixed error margin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classifier {
    error_margin: f64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_MARGIN)
    }
}

impl Classifier {
    /// Create a classifier with the given error margin in percent
    pub fn new(error_margin: f64) -> Self {
        Self { error_margin }
    }

    /// Error margin in percent
    pub fn error_margin(&self) -> f64 {
        self.error_margin
    }

    /// Classify `hz` against `previous`.
    ///
    /// A missing, non-finite or non-positive baseline yields `NoBaseline`.
    pub fn classify(&self, hz: f64, previous: Option<f64>) -> Classification {
        let previous = match previous {
            Some(p) if p.is_finite() && p > 0.0 => p,
            _ => return Classification::NoBaseline,
        };

        let difference = previous - hz;
        let percentage_difference = round3(difference / previous * 100.0);
        if percentage_difference >= self.error_margin {
            return Classification::Regression(Delta {
                difference,
                percentage_difference,
            });
        }

        if hz > 0.0 {
            let difference = hz - previous;
            let percentage_difference = round3(difference / hz * 100.0);
            if percentage_difference >= self.error_margin {
                return Classification::Improvement(Delta {
                    difference,
                    percentage_difference,
                });
            }
        }

        Classification::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regression_uses_previous_as_denominator() {
        let c = Classifier::default();
        match c.classify(96.0, Some(100.0)) {
            Classification::Regression(d) => {
                assert_eq!(d.difference, 4.0);
                assert_eq!(d.percentage_difference, 4.0);
            }
            other => panic!("expected regression, got {other:?}"),
        }
    }

    #[test]
    fn test_improvement_uses_current_as_denominator() {
        let c = Classifier::default();
        match c.classify(103.0, Some(100.0)) {
            Classification::Improvement(d) => {
                assert_eq!(d.difference, 3.0);
                assert_eq!(d.percentage_difference, 2.913);
            }
            other => panic!("expected improvement, got {other:?}"),
        }
    }

    #[test]
    fn test_asymmetry_at_threshold() {
        // +2.5% in previous terms is only 2.439% in current terms
        let c = Classifier::default();
        assert_eq!(c.classify(102.5, Some(100.0)), Classification::Unchanged);
        assert!(c.classify(97.5, Some(100.0)).is_regression());
    }

    #[test]
    fn test_within_margin() {
        let c = Classifier::default();
        assert_eq!(c.classify(99.0, Some(100.0)), Classification::Unchanged);
        assert_eq!(c.classify(100.0, Some(100.0)), Classification::Unchanged);
    }

    #[test]
    fn test_no_baseline() {
        let c = Classifier::default();
        assert_eq!(c.classify(50.0, None), Classification::NoBaseline);
        assert_eq!(c.classify(50.0, Some(0.0)), Classification::NoBaseline);
        assert_eq!(c.classify(50.0, Some(f64::NAN)), Classification::NoBaseline);
    }

    #[test]
    fn test_zero_margin_never_both() {
        let c = Classifier::new(0.0);
        let result = c.classify(100.0, Some(100.0));
        assert!(result.is_regression());
        assert!(!result.is_improvement());
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(2.91262), 2.913);
        assert_eq!(round3(4.0), 4.0);
    }
}
