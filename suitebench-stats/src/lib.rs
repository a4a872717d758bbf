#![warn(missing_docs)]
//! SuiteBench Comparison Engine
//!
//! Turns already-measured rates into verdicts:
//! - Regression/improvement classification against a baseline rate
//! - Ranking of comparison suites by rate

mod classify;
mod ranking;

pub use classify::{Classification, Classifier, DEFAULT_ERROR_MARGIN, Delta, round3};
pub use ranking::{Ranking, rank};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!((DEFAULT_ERROR_MARGIN - 2.5).abs() < f64::EPSILON);
    }
}
