//! Consumption of posterior draws produced by an external sampler.
//!
//! Draws arrive as JSON: an object mapping a scalar parameter name such as
//! `beta[2]` or `p[1]` to a chains x iterations array. Nothing beyond the
//! scalar values is interpreted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sympatry_stats::{mean, median_sorted, quantile_sorted, sorted_finite, variance};
use tracing::debug;

use crate::error::ModelError;
use crate::link::{LinkParameters, softmax_with_reference};

/// Lower and upper probabilities of the reported credible interval.
const INTERVAL: (f64, f64) = (0.025, 0.975);

/// Name of the `index`-th (1-based) element of a vector symbol.
pub fn element_name(symbol: &str, index: usize) -> String {
    format!("{symbol}[{index}]")
}

/// Posterior draws keyed by scalar parameter name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PosteriorDraws {
    draws: BTreeMap<String, Vec<Vec<f64>>>,
}

/// Location, spread and central 95% interval of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawSummary {
    /// Posterior mean.
    pub mean: f64,
    /// Posterior standard deviation (0 for a single draw).
    pub sd: f64,
    /// Posterior median.
    pub median: f64,
    /// 2.5% quantile.
    pub q025: f64,
    /// 97.5% quantile.
    pub q975: f64,
    /// Finite draws pooled over chains.
    pub n_draws: usize,
}

/// Posterior summary of one parameter next to its simulated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterComparison {
    /// Scalar parameter name, e.g. `psi[2]`.
    pub name: String,
    /// Simulated value.
    pub truth: f64,
    /// Posterior median.
    pub median: f64,
    /// Lower end of the 95% interval.
    pub lower: f64,
    /// Upper end of the 95% interval.
    pub upper: f64,
    /// Whether the interval contains the truth.
    pub covered: bool,
    /// `|median - truth|`.
    pub abs_error: f64,
}

impl PosteriorDraws {
    /// Parses draws from JSON.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        serde_json::from_str(json).map_err(|e| ModelError::Serialization {
            reason: e.to_string(),
        })
    }

    /// Adds or replaces the chains of one parameter.
    pub fn insert(&mut self, name: impl Into<String>, chains: Vec<Vec<f64>>) {
        self.draws.insert(name.into(), chains);
    }

    /// Parameter names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.draws.keys().map(String::as_str)
    }

    /// Chains of one parameter.
    pub fn chains(&self, name: &str) -> Result<&[Vec<f64>], ModelError> {
        self.draws
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ModelError::UnknownParameter {
                name: name.to_string(),
            })
    }

    /// Summarises one parameter, pooling all chains and ignoring non-finite draws.
    pub fn summarize(&self, name: &str) -> Result<DrawSummary, ModelError> {
        let pooled: Vec<f64> = self.chains(name)?.iter().flatten().copied().collect();
        let sorted = sorted_finite(&pooled);
        let empty = || ModelError::EmptyDraws {
            name: name.to_string(),
        };
        Ok(DrawSummary {
            mean: mean(&sorted),
            sd: variance(&sorted).sqrt(),
            median: median_sorted(&sorted).ok_or_else(empty)?,
            q025: quantile_sorted(&sorted, INTERVAL.0).ok_or_else(empty)?,
            q975: quantile_sorted(&sorted, INTERVAL.1).ok_or_else(empty)?,
            n_draws: sorted.len(),
        })
    }

    /// Adds `psi[1]..psi[n_states]` draws computed from the `beta` draws.
    ///
    /// Every `beta[k]` must be present with the same chains x iterations shape.
    pub fn with_derived_psi(mut self, n_states: usize) -> Result<Self, ModelError> {
        let betas = (1..n_states)
            .map(|k| self.chains(&element_name("beta", k)))
            .collect::<Result<Vec<_>, _>>()?;
        let Some(first) = betas.first() else {
            return Ok(self);
        };
        let shape: Vec<usize> = first.iter().map(Vec::len).collect();
        for chains in &betas[1..] {
            let other: Vec<usize> = chains.iter().map(Vec::len).collect();
            if other != shape {
                return Err(ModelError::DimensionMismatch {
                    what: "beta draw count".to_string(),
                    expected: shape.iter().sum(),
                    got: other.iter().sum(),
                });
            }
        }

        let mut psi = vec![Vec::with_capacity(shape.len()); n_states];
        for (c, &len) in shape.iter().enumerate() {
            for chain in &mut psi {
                chain.push(Vec::with_capacity(len));
            }
            for t in 0..len {
                let beta: Vec<f64> = betas.iter().map(|chains| chains[c][t]).collect();
                for (k, prob) in softmax_with_reference(&beta).into_iter().enumerate() {
                    psi[k][c].push(prob);
                }
            }
        }
        debug!(n_states, n_chains = shape.len(), "derived psi draws");
        for (k, chains) in psi.into_iter().enumerate() {
            self.insert(element_name("psi", k + 1), chains);
        }
        Ok(self)
    }

    /// Compares each named truth value with its posterior summary.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownParameter`] if a truth name has no draws.
    pub fn compare_to_truth(
        &self,
        truth: &BTreeMap<String, f64>,
    ) -> Result<Vec<ParameterComparison>, ModelError> {
        truth
            .iter()
            .map(|(name, &value)| {
                let summary = self.summarize(name)?;
                Ok(ParameterComparison {
                    name: name.clone(),
                    truth: value,
                    median: summary.median,
                    lower: summary.q025,
                    upper: summary.q975,
                    covered: summary.q025 <= value && value <= summary.q975,
                    abs_error: (summary.median - value).abs(),
                })
            })
            .collect()
    }
}

/// Simulated parameter values keyed the same way as [`PosteriorDraws`].
pub fn truth_values(link: &LinkParameters, detection: &[f64]) -> BTreeMap<String, f64> {
    let mut truth = BTreeMap::new();
    for (k, &b) in link.values().iter().enumerate() {
        truth.insert(element_name("beta", k + 1), b);
    }
    for (k, psi) in link.state_probs().into_iter().enumerate() {
        truth.insert(element_name("psi", k + 1), psi);
    }
    for (s, &p) in detection.iter().enumerate() {
        truth.insert(element_name("p", s + 1), p);
    }
    truth
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn draws() -> PosteriorDraws {
        PosteriorDraws::from_json(
            r#"{
                "beta[1]": [[0.0, 0.1, -0.1], [0.05, -0.05, 0.0]],
                "beta[2]": [[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
                "beta[3]": [[-1.0, -1.0, -1.0], [-1.0, -1.0, -1.0]],
                "p[1]": [[0.4, 0.5, 0.6]]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn parses_names_in_order() {
        let binding = draws();
        let names: Vec<&str> = binding.names().collect();
        assert_eq!(names, vec!["beta[1]", "beta[2]", "beta[3]", "p[1]"]);
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        assert!(matches!(
            PosteriorDraws::from_json("{\"beta[1]\": 3}"),
            Err(ModelError::Serialization { .. })
        ));
    }

    #[test]
    fn summary_pools_chains() {
        let s = draws().summarize("beta[1]").unwrap();
        assert_eq!(s.n_draws, 6);
        assert_abs_diff_eq!(s.median, 0.0, epsilon = 1e-12);
        assert!(s.q025 < 0.0 && s.q975 > 0.0);
    }

    #[test]
    fn summary_ignores_non_finite() {
        let mut d = PosteriorDraws::default();
        d.insert("x", vec![vec![1.0, f64::NAN, 3.0]]);
        let s = d.summarize("x").unwrap();
        assert_eq!(s.n_draws, 2);
        assert_abs_diff_eq!(s.median, 2.0);
        assert_abs_diff_eq!(s.mean, 2.0);
        assert_abs_diff_eq!(s.sd, 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn summary_errors() {
        let mut d = draws();
        assert!(matches!(
            d.summarize("gamma"),
            Err(ModelError::UnknownParameter { .. })
        ));
        d.insert("empty", vec![vec![]]);
        assert!(matches!(
            d.summarize("empty"),
            Err(ModelError::EmptyDraws { .. })
        ));
    }

    #[test]
    fn derived_psi_sums_to_one() {
        let d = draws().with_derived_psi(4).unwrap();
        for c in 0..2 {
            for t in 0..3 {
                let total: f64 = (1..=4)
                    .map(|k| d.chains(&element_name("psi", k)).unwrap()[c][t])
                    .sum();
                assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn derived_psi_needs_all_betas() {
        let mut d = PosteriorDraws::default();
        d.insert("beta[1]", vec![vec![0.0]]);
        assert!(matches!(
            d.with_derived_psi(4),
            Err(ModelError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn derived_psi_rejects_ragged_chains() {
        let mut d = draws();
        d.insert("beta[3]", vec![vec![0.0, 0.0], vec![0.0, 0.0, 0.0]]);
        assert!(matches!(
            d.with_derived_psi(4),
            Err(ModelError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn comparison_reports_coverage() {
        let truth: BTreeMap<String, f64> =
            [("beta[2]".to_string(), 1.0), ("p[1]".to_string(), 0.9)].into();
        let rows = draws().compare_to_truth(&truth).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "beta[2]");
        assert!(rows[0].covered);
        assert_abs_diff_eq!(rows[0].abs_error, 0.0);
        assert!(!rows[1].covered);
        assert_abs_diff_eq!(rows[1].abs_error, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn truth_values_are_named_like_draws() {
        let link = LinkParameters::new(vec![0.0, 0.0, 0.0]).unwrap();
        let truth = truth_values(&link, &[0.5, 0.9]);
        assert_eq!(truth.len(), 3 + 4 + 2);
        assert_abs_diff_eq!(truth["psi[4]"], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(truth["p[2]"], 0.9);
    }
}
