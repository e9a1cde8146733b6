//! Multinomial-logit link between free parameters and state probabilities.

use sympatry_joint::JointTable;

use crate::error::ModelError;

/// Maps `K` real parameters to `K + 1` state probabilities.
///
/// The reference state (index 0, "all absent") has unnormalised weight 1;
/// state `k >= 1` has weight `exp(params[k - 1])`. Weights are shifted by
/// their maximum log before exponentiating, so the result is finite, every
/// entry is in `[0, 1]` and the entries sum to 1 for any finite input.
pub fn softmax_with_reference(params: &[f64]) -> Vec<f64> {
    let max_log = params.iter().copied().fold(0.0, f64::max);
    let mut weights = Vec::with_capacity(params.len() + 1);
    weights.push((-max_log).exp());
    weights.extend(params.iter().map(|&b| (b - max_log).exp()));
    let total: f64 = weights.iter().sum();
    for w in weights.iter_mut() {
        *w /= total;
    }
    weights
}

/// Log-ratio parameters of a state distribution against its reference state.
///
/// The inverse of [`softmax_with_reference`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinkParameters {
    values: Vec<f64>,
}

impl LinkParameters {
    /// Wraps raw parameter values.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidInit`] if any value is non-finite.
    pub fn new(values: Vec<f64>) -> Result<Self, ModelError> {
        if let Some((k, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ModelError::InvalidInit {
                parameter: format!("beta[{}]", k + 1),
                reason: format!("must be finite, got {v}"),
            });
        }
        Ok(Self { values })
    }

    /// `ln(psi_k / psi_0)` for every non-reference combination of a joint table.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidInit`] if a cell is zero, since its log
    /// ratio is unbounded.
    pub fn from_joint<const S: usize>(table: &JointTable<S>) -> Result<Self, ModelError> {
        let reference = table.prob(0);
        let values = table.probs()[1..]
            .iter()
            .map(|&p| (p / reference).ln())
            .collect();
        Self::new(values)
    }

    /// Parameter values, one per non-reference state.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// State probabilities implied by these parameters.
    pub fn state_probs(&self) -> Vec<f64> {
        softmax_with_reference(&self.values)
    }
}
