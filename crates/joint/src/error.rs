//! Error types for the sympatry-joint crate.

/// Error type for all fallible operations in the sympatry-joint crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum JointError {
    /// Returned when a marginal occupancy probability is not strictly inside (0, 1).
    #[error("invalid marginal for species {species}: {value} (must be in (0, 1))")]
    InvalidMarginal {
        /// Zero-based species index.
        species: usize,
        /// The invalid value.
        value: f64,
    },

    /// Returned when an odds ratio is non-finite or non-positive, or a diagonal entry is not 1.
    #[error("invalid odds ratio at [{row}][{col}]: {value}")]
    InvalidOddsRatio {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
        /// The invalid value.
        value: f64,
    },

    /// Returned when the odds-ratio matrix is not symmetric.
    #[error("odds-ratio matrix is not symmetric at [{row}][{col}]")]
    AsymmetricOddsRatios {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },

    /// Returned when a conditional probability is outside (0, 1).
    #[error("invalid conditional probability: {value} (must be in (0, 1))")]
    InvalidConditional {
        /// The invalid value.
        value: f64,
    },

    /// Returned when a solver setting is invalid.
    #[error("invalid solver config: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when no valid joint distribution satisfies the constraints.
    #[error("infeasible constraint set: {reason}")]
    Infeasible {
        /// Description of the violated constraint.
        reason: String,
    },

    /// Returned when the iterative fit does not settle within the iteration budget.
    #[error(
        "infeasible constraint set: no convergence after {iterations} iterations (max change {max_change:e})"
    )]
    NotConverged {
        /// Number of sweeps performed.
        iterations: usize,
        /// Largest absolute cell change in the final sweep.
        max_change: f64,
    },
}

impl JointError {
    /// Returns `true` for the conditions that mean the constraint set has no solution.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible { .. } | Self::NotConverged { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_marginal() {
        let e = JointError::InvalidMarginal {
            species: 1,
            value: 1.0,
        };
        assert_eq!(
            e.to_string(),
            "invalid marginal for species 1: 1 (must be in (0, 1))"
        );
    }

    #[test]
    fn error_invalid_odds_ratio() {
        let e = JointError::InvalidOddsRatio {
            row: 0,
            col: 1,
            value: -2.0,
        };
        assert_eq!(e.to_string(), "invalid odds ratio at [0][1]: -2");
    }

    #[test]
    fn error_asymmetric() {
        let e = JointError::AsymmetricOddsRatios { row: 2, col: 0 };
        assert_eq!(e.to_string(), "odds-ratio matrix is not symmetric at [2][0]");
    }

    #[test]
    fn error_infeasible() {
        let e = JointError::Infeasible {
            reason: "cell 3 is negative".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "infeasible constraint set: cell 3 is negative"
        );
        assert!(e.is_infeasible());
    }

    #[test]
    fn error_not_converged_is_infeasible() {
        let e = JointError::NotConverged {
            iterations: 10,
            max_change: 0.5,
        };
        assert!(e.to_string().starts_with("infeasible constraint set"));
        assert!(e.to_string().contains("10 iterations"));
        assert!(e.is_infeasible());
    }

    #[test]
    fn input_errors_are_not_infeasible() {
        assert!(!JointError::InvalidConditional { value: 2.0 }.is_infeasible());
        assert!(
            !JointError::InvalidConfig {
                reason: "x".to_string()
            }
            .is_infeasible()
        );
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<JointError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<JointError>();
    }
}
