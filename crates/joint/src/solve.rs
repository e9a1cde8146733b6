//! Odds-ratio to joint-distribution solver.
//!
//! Two species have a closed form (the Plackett construction). For three or
//! more species the pairwise 2x2 margins are each fixed by that closed form
//! and iterative proportional fitting finds the joint table that reproduces
//! all of them, starting from the uniform table. The fixed point carries no
//! interaction beyond pairs, so for two species it is exactly the closed form.

use tracing::debug;

use crate::config::SolverConfig;
use crate::error::JointError;
use crate::inputs::{Marginals, OddsRatios};
use crate::table::{JointTable, is_present, n_combinations, pair_margin};

/// Tolerance for recovered marginals, and for recovered odds ratios on the
/// log scale, after a solve.
const RECOVERY_TOL: f64 = 1e-6;

/// Cells this far below zero are rounding noise and read as zero.
const ROUNDING_SLACK: f64 = 4.0 * f64::EPSILON;

/// Closed-form 2x2 joint table of two species.
///
/// `p_a` and `p_b` are the marginals and `odds_ratio` the association
/// between them. The returned table is indexed `[a present][b present]`.
///
/// Every cell is the admissible root of its own quadratic: the both-absent
/// cell is the both-present cell of the complementary marginals, and the
/// off-diagonal cells use the inverse odds ratio. No cell is obtained by
/// subtraction, so small cells keep their relative precision near the
/// boundaries of the marginals and at extreme odds ratios.
///
/// # Errors
///
/// Returns [`JointError::Infeasible`] if any resulting cell is negative or
/// non-finite.
pub fn pair_joint(p_a: f64, p_b: f64, odds_ratio: f64) -> Result<[[f64; 2]; 2], JointError> {
    let inverse = odds_ratio.recip();
    let mut table = [
        [
            both_present(1.0 - p_a, 1.0 - p_b, odds_ratio),
            both_present(1.0 - p_a, p_b, inverse),
        ],
        [
            both_present(p_a, 1.0 - p_b, inverse),
            both_present(p_a, p_b, odds_ratio),
        ],
    ];
    for (i, row) in table.iter_mut().enumerate() {
        for (j, p) in row.iter_mut().enumerate() {
            if (-ROUNDING_SLACK..0.0).contains(p) {
                *p = 0.0;
            }
            if !p.is_finite() || *p < 0.0 {
                return Err(JointError::Infeasible {
                    reason: format!(
                        "cell [{i}][{j}] = {p} for marginals ({p_a}, {p_b}) with odds ratio {odds_ratio}"
                    ),
                });
            }
        }
    }
    Ok(table)
}

/// Both-present cell of a pair: the admissible root of
/// `(or - 1) x^2 - (1 + (or - 1)(p_a + p_b)) x + or p_a p_b = 0`.
///
/// The discriminant and the root are arranged so that only non-negative
/// quantities are added, whichever side of 1 the odds ratio is on. At
/// `or = 1` this is `p_a p_b`.
fn both_present(p_a: f64, p_b: f64, odds_ratio: f64) -> f64 {
    let a = odds_ratio - 1.0;
    let c = odds_ratio * p_a * p_b;
    if a >= 0.0 {
        let b = 1.0 + a * (p_a + p_b);
        // b^2 - 4ac = 1 + 2a P(exactly one | independent) + a^2 (p_a - p_b)^2
        let one = p_a * (1.0 - p_b) + p_b * (1.0 - p_a);
        let d = p_a - p_b;
        let disc = 1.0 + 2.0 * a * one + a * a * d * d;
        2.0 * c / (b + disc.sqrt())
    } else {
        let (hi, lo) = if p_a >= p_b { (p_a, p_b) } else { (p_b, p_a) };
        let b = ((1.0 - hi) - lo) + odds_ratio * (p_a + p_b);
        let sq = (b * b - 4.0 * a * c).sqrt();
        if b >= 0.0 {
            2.0 * c / (b + sq)
        } else {
            (b - sq) / (2.0 * a)
        }
    }
}

/// Solves the joint co-occurrence table from marginals and pairwise odds ratios.
///
/// # Errors
///
/// * [`JointError::InvalidConfig`] if `config` is invalid or `S == 0`.
/// * [`JointError::Infeasible`] if a pairwise margin has no valid solution
///   or the fitted table fails to reproduce the targets.
/// * [`JointError::NotConverged`] if the fit does not settle within
///   `config.max_iter()` sweeps.
pub fn solve_joint<const S: usize>(
    marginals: &Marginals<S>,
    odds_ratios: &OddsRatios<S>,
    config: &SolverConfig,
) -> Result<JointTable<S>, JointError> {
    config.validate()?;
    if S == 0 {
        return Err(JointError::InvalidConfig {
            reason: "at least one species is required".to_string(),
        });
    }

    let table = match S {
        1 => {
            let p = marginals.get(0);
            JointTable::from_probs(vec![1.0 - p, p])?
        }
        2 => {
            let t = pair_joint(marginals.get(0), marginals.get(1), odds_ratios.get(0, 1))?;
            JointTable::from_probs(vec![t[0][0], t[1][0], t[0][1], t[1][1]])?
        }
        _ => JointTable::from_probs(fit_pairwise(marginals, odds_ratios, config)?)?,
    };

    check_recovery(&table, marginals, odds_ratios)?;
    Ok(table)
}

/// Iterative proportional fitting over all pairwise 2x2 margins.
///
/// Used for three or more species; with two it lands on the closed form.
pub(crate) fn fit_pairwise<const S: usize>(
    marginals: &Marginals<S>,
    odds_ratios: &OddsRatios<S>,
    config: &SolverConfig,
) -> Result<Vec<f64>, JointError> {
    let mut targets = Vec::with_capacity(S * (S - 1) / 2);
    for a in 0..S {
        for b in (a + 1)..S {
            let t = pair_joint(marginals.get(a), marginals.get(b), odds_ratios.get(a, b))?;
            targets.push((a, b, t));
        }
    }

    let n_cells = n_combinations(S);
    let mut probs = vec![1.0 / n_cells as f64; n_cells];
    let mut previous = probs.clone();
    let mut max_change = f64::INFINITY;

    for iteration in 1..=config.max_iter() {
        previous.copy_from_slice(&probs);

        for &(a, b, target) in &targets {
            let current = pair_margin(&probs, a, b);
            for (k, p) in probs.iter_mut().enumerate() {
                let i = usize::from(is_present(k, a));
                let j = usize::from(is_present(k, b));
                if current[i][j] > 0.0 {
                    *p *= target[i][j] / current[i][j];
                } else if target[i][j] > 0.0 {
                    return Err(JointError::Infeasible {
                        reason: format!(
                            "margin [{i}][{j}] of species pair ({a}, {b}) collapsed to zero"
                        ),
                    });
                }
            }
        }

        max_change = probs
            .iter()
            .zip(&previous)
            .map(|(p, q)| (p - q).abs())
            .fold(0.0, f64::max);
        if !max_change.is_finite() {
            return Err(JointError::Infeasible {
                reason: format!("non-finite cell after iteration {iteration}"),
            });
        }
        if max_change < config.tolerance() {
            debug!(iteration, max_change, "pairwise fit converged");
            return Ok(probs);
        }
    }

    Err(JointError::NotConverged {
        iterations: config.max_iter(),
        max_change,
    })
}

/// Confirms that a solved table reproduces its marginals and odds ratios.
fn check_recovery<const S: usize>(
    table: &JointTable<S>,
    marginals: &Marginals<S>,
    odds_ratios: &OddsRatios<S>,
) -> Result<(), JointError> {
    for s in 0..S {
        let got = table.marginal(s);
        if (got - marginals.get(s)).abs() > RECOVERY_TOL {
            return Err(JointError::Infeasible {
                reason: format!(
                    "marginal of species {s} is {got}, target {}",
                    marginals.get(s)
                ),
            });
        }
    }
    for a in 0..S {
        for b in (a + 1)..S {
            let got = table.odds_ratio(a, b);
            let want = odds_ratios.get(a, b);
            if !got.is_finite() || got <= 0.0 || (got.ln() - want.ln()).abs() > RECOVERY_TOL {
                return Err(JointError::Infeasible {
                    reason: format!("odds ratio of species ({a}, {b}) is {got}, target {want}"),
                });
            }
        }
    }
    Ok(())
}
