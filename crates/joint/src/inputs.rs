//! Validated solver inputs: marginal occupancy and pairwise odds ratios.

use crate::error::JointError;

/// Relative tolerance used when checking odds-ratio symmetry.
const SYMMETRY_TOL: f64 = 1e-12;

/// Marginal occupancy probabilities, one per species.
///
/// Every entry lies strictly inside (0, 1); the boundary values would make
/// the odds of presence degenerate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marginals<const S: usize> {
    probs: [f64; S],
}

impl<const S: usize> Marginals<S> {
    /// Creates validated marginals.
    ///
    /// # Errors
    ///
    /// Returns [`JointError::InvalidMarginal`] for the first entry that is
    /// non-finite or outside the open interval (0, 1).
    pub fn new(probs: [f64; S]) -> Result<Self, JointError> {
        for (species, &value) in probs.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 || value >= 1.0 {
                return Err(JointError::InvalidMarginal { species, value });
            }
        }
        Ok(Self { probs })
    }

    /// Returns the marginal for a zero-based species index.
    pub fn get(&self, species: usize) -> f64 {
        self.probs[species]
    }

    /// Returns all marginals.
    pub fn as_array(&self) -> &[f64; S] {
        &self.probs
    }
}

/// Symmetric matrix of pairwise occupancy odds ratios with unit diagonal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OddsRatios<const S: usize> {
    matrix: [[f64; S]; S],
}

impl<const S: usize> OddsRatios<S> {
    /// Creates a validated odds-ratio matrix.
    ///
    /// # Errors
    ///
    /// Returns [`JointError::InvalidOddsRatio`] if an entry is non-finite or
    /// non-positive, or a diagonal entry differs from 1, and
    /// [`JointError::AsymmetricOddsRatios`] if `matrix[i][j] != matrix[j][i]`.
    pub fn new(matrix: [[f64; S]; S]) -> Result<Self, JointError> {
        for (row, values) in matrix.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if !value.is_finite() || value <= 0.0 {
                    return Err(JointError::InvalidOddsRatio { row, col, value });
                }
                if row == col && (value - 1.0).abs() > SYMMETRY_TOL {
                    return Err(JointError::InvalidOddsRatio { row, col, value });
                }
                let mirror = matrix[col][row];
                if (value - mirror).abs() > SYMMETRY_TOL * value.max(mirror) {
                    return Err(JointError::AsymmetricOddsRatios { row, col });
                }
            }
        }
        Ok(Self { matrix })
    }

    /// All species independent (every odds ratio equal to 1).
    pub fn independent() -> Self {
        Self {
            matrix: [[1.0; S]; S],
        }
    }

    /// Returns the odds ratio between species `a` and `b`.
    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.matrix[a][b]
    }

    /// Returns the full matrix.
    pub fn as_matrix(&self) -> &[[f64; S]; S] {
        &self.matrix
    }
}

impl OddsRatios<2> {
    /// Two-species matrix with a single off-diagonal odds ratio.
    pub fn pair(odds_ratio: f64) -> Result<Self, JointError> {
        Self::new([[1.0, odds_ratio], [odds_ratio, 1.0]])
    }
}

/// Odds ratio implied by the conditional occupancy of one species given another.
///
/// `p_given_absent` is `P(b present | a absent)` and `p_given_present` is
/// `P(b present | a present)`. The result is
/// `odds(p_given_present) / odds(p_given_absent)`, which is symmetric in
/// the roles of `a` and `b`.
///
/// # Errors
///
/// Returns [`JointError::InvalidConditional`] if either probability is
/// outside (0, 1).
pub fn odds_ratio_from_conditionals(
    p_given_absent: f64,
    p_given_present: f64,
) -> Result<f64, JointError> {
    for value in [p_given_absent, p_given_present] {
        if !value.is_finite() || value <= 0.0 || value >= 1.0 {
            return Err(JointError::InvalidConditional { value });
        }
    }
    let odds = |p: f64| p / (1.0 - p);
    Ok(odds(p_given_present) / odds(p_given_absent))
}
