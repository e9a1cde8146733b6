//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result, bail};

use sympatry_joint::{
    JointTable, Marginals, OddsRatios, SolverConfig, odds_ratio_from_conditionals,
};
use sympatry_model::Prior;

use crate::config::*;

/// Largest absolute gap tolerated between given and solved conditionals.
const CONDITIONAL_TOL: f64 = 1e-6;

/// Copies a per-species list into a fixed-size array.
pub fn to_array<const S: usize>(values: &[f64], what: &str) -> Result<[f64; S]> {
    <[f64; S]>::try_from(values)
        .with_context(|| format!("{what} must have {S} entries, got {}", values.len()))
}

/// Rejects an empty survey before anything is simulated.
pub fn validate_survey(survey: &SurveyToml) -> Result<()> {
    if survey.n_sites == 0 {
        bail!("number of sites must be at least 1");
    }
    if survey.n_visits == 0 {
        bail!("number of visits must be at least 1");
    }
    Ok(())
}

/// Builds validated [`Marginals`] from the TOML occupancy configuration.
pub fn build_marginals<const S: usize>(occupancy: &OccupancyToml) -> Result<Marginals<S>> {
    let probs = to_array::<S>(&occupancy.marginals, "occupancy.marginals")?;
    Ok(Marginals::new(probs)?)
}

/// Builds [`OddsRatios`] from whichever association form is set.
///
/// `odds_ratio` and `conditionals` describe a single pair and need exactly
/// two species; `odds_ratios` is a full S x S matrix.
pub fn build_odds_ratios<const S: usize>(occupancy: &OccupancyToml) -> Result<OddsRatios<S>> {
    let pair = |or: f64| -> Result<OddsRatios<S>> {
        if S != 2 {
            bail!("a single odds ratio needs exactly 2 species, got {S}");
        }
        let mut matrix = [[1.0; S]; S];
        matrix[0][1] = or;
        matrix[1][0] = or;
        Ok(OddsRatios::new(matrix)?)
    };
    match (
        occupancy.odds_ratio,
        &occupancy.odds_ratios,
        &occupancy.conditionals,
    ) {
        (None, None, None) => Ok(OddsRatios::independent()),
        (Some(or), None, None) => pair(or),
        (None, None, Some(c)) => pair(odds_ratio_from_conditionals(
            c.given_absent,
            c.given_present,
        )?),
        (None, Some(rows), None) => {
            if rows.len() != S {
                bail!("occupancy.odds_ratios must have {S} rows, got {}", rows.len());
            }
            let mut matrix = [[0.0; S]; S];
            for (dst, src) in matrix.iter_mut().zip(rows) {
                *dst = to_array::<S>(src, "occupancy.odds_ratios row")?;
            }
            Ok(OddsRatios::new(matrix)?)
        }
        _ => bail!("set at most one of odds_ratio, odds_ratios or conditionals"),
    }
}

/// Builds a [`SolverConfig`] from the TOML solver configuration.
pub fn build_solver_config(solver: &SolverToml) -> Result<SolverConfig> {
    let cfg = SolverConfig::new()
        .with_tolerance(solver.tolerance)
        .with_max_iter(solver.max_iter);
    cfg.validate()?;
    Ok(cfg)
}

/// Zero-mean normal prior for the link parameters.
pub fn build_link_prior(priors: &PriorsToml) -> Prior {
    Prior::Normal {
        mean: 0.0,
        sd: priors.link_sd,
    }
}

/// Parses the detection prior family.
pub fn build_detection_prior(priors: &PriorsToml) -> Result<Prior> {
    match priors.detection.to_lowercase().as_str() {
        "uniform" => Ok(Prior::unit_uniform()),
        "beta" => Ok(Prior::Beta {
            alpha: priors.beta_alpha,
            beta: priors.beta_beta,
        }),
        other => bail!("unknown detection prior: {other:?}"),
    }
}

/// Reverse conditionals that disagree with the solved table.
///
/// The forward pair fixes the odds ratio, so a reverse pair can only be
/// checked, never honoured. Returns `(given_absent, given_present)` gaps for
/// each reverse conditional off by more than the tolerance.
pub fn conditional_mismatch<const S: usize>(
    occupancy: &OccupancyToml,
    table: &JointTable<S>,
) -> Option<(f64, f64)> {
    let reverse = occupancy.conditionals.as_ref()?.reverse.as_ref()?;
    let absent = reverse.given_absent - table.conditional(0, 1, false);
    let present = reverse.given_present - table.conditional(0, 1, true);
    (absent.abs() > CONDITIONAL_TOL || present.abs() > CONDITIONAL_TOL)
        .then_some((absent, present))
}
