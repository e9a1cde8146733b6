//! Configuration for the iterative joint solver.

use crate::error::JointError;

/// Convergence settings for [`solve_joint`](crate::solve_joint).
///
/// # Example
///
/// ```
/// use sympatry_joint::SolverConfig;
///
/// let config = SolverConfig::new()
///     .with_tolerance(1e-12)
///     .with_max_iter(5_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SolverConfig {
    tolerance: f64,
    max_iter: usize,
}

impl SolverConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `tolerance = 1e-10`, `max_iter = 1000`.
    pub fn new() -> Self {
        Self {
            tolerance: 1e-10,
            max_iter: 1000,
        }
    }

    /// Sets the maximum absolute cell change that counts as converged.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum number of fitting sweeps.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Returns the convergence tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Returns the maximum number of sweeps.
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), JointError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(JointError::InvalidConfig {
                reason: format!(
                    "tolerance must be finite and positive, got {}",
                    self.tolerance
                ),
            });
        }
        if self.max_iter == 0 {
            return Err(JointError::InvalidConfig {
                reason: "max_iter must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::new()
    }
}
