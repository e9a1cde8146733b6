//! Parameter priors.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Beta, Continuous, Normal, Uniform};

use crate::error::ModelError;

/// A univariate prior distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Prior {
    /// Normal with location `mean` and scale `sd`.
    Normal {
        /// Location.
        mean: f64,
        /// Standard deviation.
        sd: f64,
    },
    /// Beta with shapes `alpha` and `beta`.
    Beta {
        /// First shape.
        alpha: f64,
        /// Second shape.
        beta: f64,
    },
    /// Continuous uniform on `(lower, upper)`.
    Uniform {
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
    },
}

impl Prior {
    /// Zero-mean, unit-variance normal, the default link-parameter prior.
    pub fn standard_normal() -> Self {
        Self::Normal { mean: 0.0, sd: 1.0 }
    }

    /// Uniform on (0, 1), the default detection prior.
    pub fn unit_uniform() -> Self {
        Self::Uniform {
            lower: 0.0,
            upper: 1.0,
        }
    }

    /// Open interval on which the density is positive.
    pub fn support(&self) -> (f64, f64) {
        match *self {
            Self::Normal { .. } => (f64::NEG_INFINITY, f64::INFINITY),
            Self::Beta { .. } => (0.0, 1.0),
            Self::Uniform { lower, upper } => (lower, upper),
        }
    }

    /// Log density at `x`; `-inf` outside the support.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPrior`] if the hyperparameters are invalid.
    pub fn log_density(&self, x: f64) -> Result<f64, ModelError> {
        let invalid = |reason: String| ModelError::InvalidPrior {
            parameter: self.family().to_string(),
            reason,
        };
        let (lo, hi) = self.support();
        if x <= lo || x >= hi {
            return Ok(f64::NEG_INFINITY);
        }
        match *self {
            Self::Normal { mean, sd } => Normal::new(mean, sd)
                .map(|d| d.ln_pdf(x))
                .map_err(|e| invalid(e.to_string())),
            Self::Beta { alpha, beta } => Beta::new(alpha, beta)
                .map(|d| d.ln_pdf(x))
                .map_err(|e| invalid(e.to_string())),
            Self::Uniform { lower, upper } => Uniform::new(lower, upper)
                .map(|d| d.ln_pdf(x))
                .map_err(|e| invalid(e.to_string())),
        }
    }

    /// Checks the hyperparameters by evaluating the density once.
    fn check(&self, parameter: &str) -> Result<(), ModelError> {
        let (lo, hi) = self.support();
        let point = match (lo.is_finite(), hi.is_finite()) {
            (true, true) => 0.5 * (lo + hi),
            _ => 0.0,
        };
        match self.log_density(point) {
            Ok(v) if v.is_finite() => Ok(()),
            Ok(v) => Err(ModelError::InvalidPrior {
                parameter: parameter.to_string(),
                reason: format!("density at {point} is {v}"),
            }),
            Err(ModelError::InvalidPrior { reason, .. }) => Err(ModelError::InvalidPrior {
                parameter: parameter.to_string(),
                reason,
            }),
            Err(e) => Err(e),
        }
    }

    /// Validates a prior for an unconstrained link parameter.
    ///
    /// The support must be the whole real line.
    pub fn validate_for_link(&self, parameter: &str) -> Result<(), ModelError> {
        if self.support() != (f64::NEG_INFINITY, f64::INFINITY) {
            return Err(ModelError::InvalidPrior {
                parameter: parameter.to_string(),
                reason: format!("{} prior does not cover the real line", self.family()),
            });
        }
        self.check(parameter)
    }

    /// Validates a prior for a detection probability.
    ///
    /// The support must be exactly (0, 1).
    pub fn validate_for_probability(&self, parameter: &str) -> Result<(), ModelError> {
        if self.support() != (0.0, 1.0) {
            let (lo, hi) = self.support();
            return Err(ModelError::InvalidPrior {
                parameter: parameter.to_string(),
                reason: format!("support ({lo}, {hi}) is not (0, 1)"),
            });
        }
        self.check(parameter)
    }

    fn family(&self) -> &'static str {
        match self {
            Self::Normal { .. } => "normal",
            Self::Beta { .. } => "beta",
            Self::Uniform { .. } => "uniform",
        }
    }
}
