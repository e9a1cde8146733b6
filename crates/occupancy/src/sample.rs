//! Correlated binary occupancy sampling.

use sympatry_joint::{JointTable, combination_bits, n_combinations};
use tracing::debug;

use crate::error::OccupancyError;
use crate::matrix::OccupancyMatrix;

/// Draws one combination index from a joint table, using the cumulative CDF.
///
/// Draws a uniform random number and walks the cells in index order,
/// returning the first whose cumulative probability meets or exceeds the
/// draw. Falls back to the last non-empty cell if rounding prevents a match.
pub fn sample_combination<const S: usize>(table: &JointTable<S>, rng: &mut impl rand::Rng) -> usize {
    let u: f64 = rng.random();
    let mut cumulative = 0.0;
    for (k, &p) in table.probs().iter().enumerate() {
        cumulative += p;
        if p > 0.0 && cumulative >= u {
            return k;
        }
    }
    table
        .probs()
        .iter()
        .rposition(|&p| p > 0.0)
        .unwrap_or(n_combinations(S) - 1)
}

/// Draws `n_sites` independent presence vectors from a joint table.
///
/// # Errors
///
/// Returns [`OccupancyError::ZeroSites`] if `n_sites == 0`.
pub fn sample_occupancy<const S: usize>(
    table: &JointTable<S>,
    n_sites: usize,
    rng: &mut impl rand::Rng,
) -> Result<OccupancyMatrix<S>, OccupancyError> {
    if n_sites == 0 {
        return Err(OccupancyError::ZeroSites);
    }
    let mut rows = vec![[false; S]; n_sites];
    sample_occupancy_into(table, rng, &mut rows)?;
    debug!(n_sites, n_species = S, "sampled latent occupancy");
    OccupancyMatrix::from_rows(rows)
}

/// Draws presence vectors into a pre-allocated buffer, one per element.
///
/// # Errors
///
/// Returns [`OccupancyError::BufferLengthMismatch`] if `out` is empty.
pub fn sample_occupancy_into<const S: usize>(
    table: &JointTable<S>,
    rng: &mut impl rand::Rng,
    out: &mut [[bool; S]],
) -> Result<(), OccupancyError> {
    if out.is_empty() {
        return Err(OccupancyError::BufferLengthMismatch {
            expected: 1,
            got: 0,
        });
    }
    for row in out.iter_mut() {
        *row = combination_bits(sample_combination(table, rng));
    }
    Ok(())
}
