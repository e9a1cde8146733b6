//! Deterministic state-to-observation probability table.

use serde::{Deserialize, Serialize};
use sympatry_joint::{is_present, n_combinations};

/// Row-stochastic table `P(observation | true state)`.
///
/// Rows are latent states and columns observation codes, both indexed by
/// combination (code minus one).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectionTable {
    rows: Vec<Vec<f64>>,
}

impl DetectionTable {
    /// Number of states (and observation codes).
    pub fn n_states(&self) -> usize {
        self.rows.len()
    }

    /// `P(observation code | state code)`, both 1-based.
    pub fn prob(&self, state_code: usize, obs_code: usize) -> f64 {
        self.rows[state_code - 1][obs_code - 1]
    }

    /// Row of a 1-based state code.
    pub fn row(&self, state_code: usize) -> &[f64] {
        &self.rows[state_code - 1]
    }

    /// All rows.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }
}

/// Builds the detection table for `S` species with per-visit detection `p`.
///
/// For true state `z` and observation `o`, each species contributes a
/// factor: if present, `p_s` when detected and `1 - p_s` when missed; if
/// absent, 1 when not detected and 0 otherwise. So the all-absent state
/// always yields "nothing detected", single-species states are Bernoulli
/// in their own species, and joint presence is the product measure.
pub fn detection_table<const S: usize>(p: &[f64; S]) -> DetectionTable {
    detection_table_from_slice(p)
}

/// [`detection_table`] for a species count only known at run time.
pub fn detection_table_from_slice(p: &[f64]) -> DetectionTable {
    let n_species = p.len();
    let n = n_combinations(n_species);
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|state| {
            (0..n)
                .map(|obs| {
                    (0..n_species)
                        .map(|s| match (is_present(state, s), is_present(obs, s)) {
                            (true, true) => p[s],
                            (true, false) => 1.0 - p[s],
                            (false, false) => 1.0,
                            (false, true) => 0.0,
                        })
                        .product()
                })
                .collect()
        })
        .collect();
    DetectionTable { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn two_species_layout() {
        let (pa, pb) = (0.5, 0.9);
        let t = detection_table(&[pa, pb]);
        assert_eq!(t.n_states(), 4);

        assert_eq!(t.row(1), &[1.0, 0.0, 0.0, 0.0]);

        assert_abs_diff_eq!(t.prob(2, 1), 1.0 - pa);
        assert_abs_diff_eq!(t.prob(2, 2), pa);
        assert_eq!(t.prob(2, 3), 0.0);
        assert_eq!(t.prob(2, 4), 0.0);

        assert_abs_diff_eq!(t.prob(3, 1), 1.0 - pb);
        assert_eq!(t.prob(3, 2), 0.0);
        assert_abs_diff_eq!(t.prob(3, 3), pb);
        assert_eq!(t.prob(3, 4), 0.0);

        assert_abs_diff_eq!(t.prob(4, 1), (1.0 - pa) * (1.0 - pb), epsilon = 1e-15);
        assert_abs_diff_eq!(t.prob(4, 2), pa * (1.0 - pb), epsilon = 1e-15);
        assert_abs_diff_eq!(t.prob(4, 3), (1.0 - pa) * pb, epsilon = 1e-15);
        assert_abs_diff_eq!(t.prob(4, 4), pa * pb, epsilon = 1e-15);
    }

    #[test]
    fn rows_sum_to_one() {
        let t = detection_table(&[0.2, 0.7, 0.45]);
        assert_eq!(t.n_states(), 8);
        for row in t.rows() {
            assert_abs_diff_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn serializes_as_nested_rows() {
        let t = detection_table(&[1.0]);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "[[1.0,0.0],[0.0,1.0]]");
    }
}
