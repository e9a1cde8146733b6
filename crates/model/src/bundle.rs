//! Data and initial values handed to the external sampler.

use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Observed data: an N x J matrix of codes in `1..=2^S` and its dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBundle {
    /// Observation codes, one row per site.
    pub observations: Vec<Vec<u8>>,
    /// Number of sites (N).
    pub site_count: usize,
    /// Number of visits per site (J).
    pub visit_count: usize,
}

impl DataBundle {
    /// Checks that the declared dimensions match the matrix and every code
    /// is in `1..=n_states`.
    pub fn validate(&self, n_states: usize) -> Result<(), ModelError> {
        if self.site_count == 0 {
            return Err(ModelError::DimensionMismatch {
                what: "site count".to_string(),
                expected: 1,
                got: 0,
            });
        }
        if self.visit_count == 0 {
            return Err(ModelError::DimensionMismatch {
                what: "visit count".to_string(),
                expected: 1,
                got: 0,
            });
        }
        if self.observations.len() != self.site_count {
            return Err(ModelError::DimensionMismatch {
                what: "observation rows".to_string(),
                expected: self.site_count,
                got: self.observations.len(),
            });
        }
        for row in &self.observations {
            if row.len() != self.visit_count {
                return Err(ModelError::DimensionMismatch {
                    what: "observation columns".to_string(),
                    expected: self.visit_count,
                    got: row.len(),
                });
            }
            if let Some(&code) = row
                .iter()
                .find(|&&c| c == 0 || usize::from(c) > n_states)
            {
                return Err(ModelError::InvalidCode {
                    what: "observation".to_string(),
                    code: usize::from(code),
                    max: n_states,
                });
            }
        }
        Ok(())
    }
}

/// Starting point for one sampler chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialValues {
    /// Latent state code of every site, in `1..=2^S`.
    pub latent_states: Vec<usize>,
    /// Detection probability of every species, in (0, 1).
    pub detection_probs: Vec<f64>,
    /// Link parameters, `2^S - 1` reals.
    pub link_parameters: Vec<f64>,
}

impl InitialValues {
    /// Checks lengths and supports against the model dimensions.
    pub fn validate(
        &self,
        n_sites: usize,
        n_species: usize,
        n_states: usize,
    ) -> Result<(), ModelError> {
        if self.latent_states.len() != n_sites {
            return Err(ModelError::DimensionMismatch {
                what: "initial latent states".to_string(),
                expected: n_sites,
                got: self.latent_states.len(),
            });
        }
        if let Some(&code) = self
            .latent_states
            .iter()
            .find(|&&z| z == 0 || z > n_states)
        {
            return Err(ModelError::InvalidCode {
                what: "latent state".to_string(),
                code,
                max: n_states,
            });
        }
        if self.detection_probs.len() != n_species {
            return Err(ModelError::DimensionMismatch {
                what: "initial detection probabilities".to_string(),
                expected: n_species,
                got: self.detection_probs.len(),
            });
        }
        for (s, &p) in self.detection_probs.iter().enumerate() {
            if !(p > 0.0 && p < 1.0) {
                return Err(ModelError::InvalidInit {
                    parameter: format!("p[{}]", s + 1),
                    reason: format!("must be in (0, 1), got {p}"),
                });
            }
        }
        if self.link_parameters.len() != n_states - 1 {
            return Err(ModelError::DimensionMismatch {
                what: "initial link parameters".to_string(),
                expected: n_states - 1,
                got: self.link_parameters.len(),
            });
        }
        for (k, &b) in self.link_parameters.iter().enumerate() {
            if !b.is_finite() {
                return Err(ModelError::InvalidInit {
                    parameter: format!("beta[{}]", k + 1),
                    reason: format!("must be finite, got {b}"),
                });
            }
        }
        Ok(())
    }

    /// Perturbed copy for an additional chain.
    ///
    /// Link parameters receive Normal(0, `sd`) noise; detection
    /// probabilities are perturbed on the logit scale so they stay in
    /// (0, 1). Latent states are unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidInit`] if `sd` is negative or non-finite.
    pub fn jittered(&self, sd: f64, rng: &mut impl rand::Rng) -> Result<Self, ModelError> {
        if !sd.is_finite() {
            return Err(ModelError::InvalidInit {
                parameter: "jitter".to_string(),
                reason: format!("sd must be finite, got {sd}"),
            });
        }
        let noise = Normal::new(0.0, sd).map_err(|e| ModelError::InvalidInit {
            parameter: "jitter".to_string(),
            reason: e.to_string(),
        })?;

        let link_parameters = self
            .link_parameters
            .iter()
            .map(|&b| b + noise.sample(rng))
            .collect();
        let detection_probs = self
            .detection_probs
            .iter()
            .map(|&p| {
                let logit = (p / (1.0 - p)).ln() + noise.sample(rng);
                (1.0 / (1.0 + (-logit).exp())).clamp(1e-6, 1.0 - 1e-6)
            })
            .collect();

        Ok(Self {
            latent_states: self.latent_states.clone(),
            detection_probs,
            link_parameters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bundle() -> DataBundle {
        DataBundle {
            observations: vec![vec![1, 2, 4], vec![3, 1, 1]],
            site_count: 2,
            visit_count: 3,
        }
    }

    fn inits() -> InitialValues {
        InitialValues {
            latent_states: vec![4, 3],
            detection_probs: vec![0.5, 0.5],
            link_parameters: vec![0.0, 0.1, -0.2],
        }
    }

    #[test]
    fn valid_bundle() {
        assert!(bundle().validate(4).is_ok());
    }

    #[test]
    fn bundle_row_mismatch() {
        let mut b = bundle();
        b.site_count = 3;
        assert!(matches!(
            b.validate(4),
            Err(ModelError::DimensionMismatch {
                expected: 3,
                got: 2,
                ..
            })
        ));
    }

    #[test]
    fn bundle_column_mismatch() {
        let mut b = bundle();
        b.observations[1].pop();
        assert!(matches!(
            b.validate(4),
            Err(ModelError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn bundle_bad_code() {
        let mut b = bundle();
        b.observations[0][0] = 5;
        assert!(matches!(
            b.validate(4),
            Err(ModelError::InvalidCode { code: 5, max: 4, .. })
        ));
    }

    #[test]
    fn inits_validation() {
        assert!(inits().validate(2, 2, 4).is_ok());

        let mut bad = inits();
        bad.latent_states[0] = 0;
        assert!(bad.validate(2, 2, 4).is_err());

        let mut bad = inits();
        bad.detection_probs[1] = 1.0;
        assert!(matches!(
            bad.validate(2, 2, 4),
            Err(ModelError::InvalidInit { .. })
        ));

        let mut bad = inits();
        bad.link_parameters.push(0.0);
        assert!(bad.validate(2, 2, 4).is_err());
    }

    #[test]
    fn jitter_keeps_support_and_states() {
        let base = inits();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let j = base.jittered(2.0, &mut rng).unwrap();
            assert_eq!(j.latent_states, base.latent_states);
            assert!(j.validate(2, 2, 4).is_ok());
        }
    }

    #[test]
    fn zero_jitter_is_identity_on_link() {
        let base = inits();
        let mut rng = StdRng::seed_from_u64(5);
        let j = base.jittered(0.0, &mut rng).unwrap();
        assert_eq!(j.link_parameters, base.link_parameters);
    }

    #[test]
    fn negative_jitter_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        assert!(inits().jittered(-1.0, &mut rng).is_err());
    }
}
