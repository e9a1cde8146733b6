//! Joint probability table over all species co-occurrence combinations.

use crate::error::JointError;

/// Number of occupancy combinations for `S` species.
///
/// `s` must be below `usize::BITS`; counts read from untrusted input go
/// through [`checked_combinations`].
pub const fn n_combinations(s: usize) -> usize {
    1 << s
}

/// `2^s`, or `None` if it does not fit in a `usize`.
pub const fn checked_combinations(s: usize) -> Option<usize> {
    if s > u32::MAX as usize {
        return None;
    }
    1usize.checked_shl(s as u32)
}

/// Returns `true` if species `s` is present in combination index `k`.
///
/// Combination indices are bitmasks: species 0 is the lowest bit.
#[inline]
pub fn is_present(k: usize, s: usize) -> bool {
    (k >> s) & 1 == 1
}

/// Converts a presence vector into its combination index.
pub fn combination_index<const S: usize>(bits: &[bool; S]) -> usize {
    bits.iter()
        .enumerate()
        .fold(0, |k, (s, &present)| k | (usize::from(present) << s))
}

/// Converts a combination index into its presence vector.
pub fn combination_bits<const S: usize>(k: usize) -> [bool; S] {
    std::array::from_fn(|s| is_present(k, s))
}

/// Tolerance on the total mass of a solved table before renormalisation.
const MASS_TOL: f64 = 1e-9;

/// A probability distribution over the `2^S` occupancy combinations.
///
/// Cells are indexed by combination bitmask (see [`combination_index`]).
/// Once constructed the table is immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct JointTable<const S: usize> {
    probs: Vec<f64>,
}

impl<const S: usize> JointTable<S> {
    /// Constructs a table from raw cell probabilities.
    ///
    /// # Errors
    ///
    /// Returns [`JointError::Infeasible`] if the length is not `2^S`, a cell
    /// is non-finite or outside `[0, 1]`, or the cells do not sum to 1
    /// within `1e-9`. Accepted tables are renormalised to sum exactly to 1.
    pub fn from_probs(mut probs: Vec<f64>) -> Result<Self, JointError> {
        if probs.len() != n_combinations(S) {
            return Err(JointError::Infeasible {
                reason: format!(
                    "table has {} cells, expected {}",
                    probs.len(),
                    n_combinations(S)
                ),
            });
        }
        for (k, &p) in probs.iter().enumerate() {
            if !p.is_finite() {
                return Err(JointError::Infeasible {
                    reason: format!("cell {k} is not finite: {p}"),
                });
            }
            if !(0.0..=1.0).contains(&p) {
                return Err(JointError::Infeasible {
                    reason: format!("cell {k} = {p} is outside [0, 1]"),
                });
            }
        }
        let total: f64 = probs.iter().sum();
        if (total - 1.0).abs() > MASS_TOL {
            return Err(JointError::Infeasible {
                reason: format!("cells sum to {total}, expected 1"),
            });
        }
        for p in probs.iter_mut() {
            *p /= total;
        }
        Ok(Self { probs })
    }

    /// Number of species.
    pub fn n_species(&self) -> usize {
        S
    }

    /// Returns the probability of combination index `k`.
    pub fn prob(&self, k: usize) -> f64 {
        self.probs[k]
    }

    /// Returns the probability of a presence vector.
    pub fn prob_of(&self, bits: &[bool; S]) -> f64 {
        self.probs[combination_index(bits)]
    }

    /// Returns all cell probabilities in combination-index order.
    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    /// Marginal probability that species `s` is present.
    pub fn marginal(&self, s: usize) -> f64 {
        self.probs
            .iter()
            .enumerate()
            .filter(|&(k, _)| is_present(k, s))
            .map(|(_, &p)| p)
            .sum()
    }

    /// The 2x2 marginal table of species `a` (rows) and `b` (columns).
    ///
    /// `table[1][1]` is the probability that both are present.
    pub fn pair_table(&self, a: usize, b: usize) -> [[f64; 2]; 2] {
        pair_margin(&self.probs, a, b)
    }

    /// Odds ratio between species `a` and `b` implied by the table.
    pub fn odds_ratio(&self, a: usize, b: usize) -> f64 {
        let t = self.pair_table(a, b);
        (t[1][1] * t[0][0]) / (t[1][0] * t[0][1])
    }

    /// `P(target present | given present == given_present)`.
    pub fn conditional(&self, target: usize, given: usize, given_present: bool) -> f64 {
        let t = self.pair_table(given, target);
        let row = usize::from(given_present);
        t[row][1] / (t[row][0] + t[row][1])
    }
}

/// Sums a flat combination table into the 2x2 margin of species `a` and `b`.
pub(crate) fn pair_margin(probs: &[f64], a: usize, b: usize) -> [[f64; 2]; 2] {
    let mut t = [[0.0; 2]; 2];
    for (k, &p) in probs.iter().enumerate() {
        t[usize::from(is_present(k, a))][usize::from(is_present(k, b))] += p;
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn example() -> JointTable<2> {
        // index order: 00, 10, 01, 11
        JointTable::from_probs(vec![0.4, 0.1, 0.2, 0.3]).unwrap()
    }

    #[test]
    fn index_round_trip() {
        for k in 0..8 {
            let bits: [bool; 3] = combination_bits(k);
            assert_eq!(combination_index(&bits), k);
        }
        assert_eq!(combination_index(&[true, false]), 1);
        assert_eq!(combination_index(&[false, true]), 2);
    }

    #[test]
    fn checked_combination_count() {
        assert_eq!(checked_combinations(0), Some(1));
        assert_eq!(checked_combinations(3), Some(8));
        assert_eq!(checked_combinations(usize::BITS as usize - 1), Some(1 << (usize::BITS - 1)));
        assert_eq!(checked_combinations(usize::BITS as usize), None);
        assert_eq!(checked_combinations(usize::MAX), None);
    }

    #[test]
    fn marginals_and_pair_table() {
        let t = example();
        assert_relative_eq!(t.marginal(0), 0.4);
        assert_relative_eq!(t.marginal(1), 0.5);
        let pt = t.pair_table(0, 1);
        assert_relative_eq!(pt[0][0], 0.4);
        assert_relative_eq!(pt[1][0], 0.1);
        assert_relative_eq!(pt[0][1], 0.2);
        assert_relative_eq!(pt[1][1], 0.3);
    }

    #[test]
    fn odds_ratio_and_conditional() {
        let t = example();
        assert_relative_eq!(t.odds_ratio(0, 1), 0.3 * 0.4 / (0.1 * 0.2), epsilon = 1e-12);
        assert_relative_eq!(t.odds_ratio(1, 0), t.odds_ratio(0, 1), epsilon = 1e-12);
        assert_relative_eq!(t.conditional(1, 0, true), 0.75, epsilon = 1e-12);
        assert_relative_eq!(t.conditional(1, 0, false), 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(JointTable::<2>::from_probs(vec![0.5, 0.5]).is_err());
    }

    #[test]
    fn rejects_negative_cell() {
        let err = JointTable::<2>::from_probs(vec![0.6, 0.5, -0.1, 0.0]).unwrap_err();
        assert!(err.is_infeasible());
    }

    #[test]
    fn rejects_bad_mass() {
        assert!(JointTable::<2>::from_probs(vec![0.3, 0.3, 0.3, 0.3]).is_err());
    }
}
