//! Model specification assembly and hand-off validation.

use serde::{Deserialize, Serialize};
use sympatry_detect::{MAX_SPECIES, ObservationMatrix};
use sympatry_joint::{checked_combinations, n_combinations};
use sympatry_occupancy::OccupancyMatrix;
use tracing::{debug, info};

use crate::bundle::{DataBundle, InitialValues};
use crate::detection::{detection_table, detection_table_from_slice};
use crate::error::ModelError;
use crate::link::softmax_with_reference;
use crate::prior::Prior;
use crate::statement::{Statement, occupancy_statements};

/// Priors attached to the two parameter groups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorSet {
    /// Prior of every link parameter.
    pub link: Prior,
    /// Prior of every detection probability.
    pub detection: Prior,
}

/// The complete artifact consumed by an external sampler: model structure,
/// data, and initial values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Number of species (S).
    pub n_species: usize,
    /// Number of latent states and observation codes (`2^S`).
    pub n_states: usize,
    /// Priors referenced by the statements.
    pub priors: PriorSet,
    /// Generative model.
    pub statements: Vec<Statement>,
    /// Observed data.
    pub data: DataBundle,
    /// Initial values for the sampler.
    pub inits: InitialValues,
}

impl ModelSpec {
    /// Re-checks every hand-off invariant.
    ///
    /// The species count must be encodable, dimensions of data and inits
    /// must agree, every code must be in range, priors must have the right
    /// support and match the statements, and the initial configuration must
    /// give each observation non-zero probability.
    pub fn validate(&self) -> Result<(), ModelError> {
        let expected = checked_combinations(self.n_species)
            .filter(|_| (1..=MAX_SPECIES).contains(&self.n_species))
            .ok_or(ModelError::InvalidSpeciesCount {
                n_species: self.n_species,
                max: MAX_SPECIES,
            })?;
        if self.n_states != expected {
            return Err(ModelError::DimensionMismatch {
                what: "state count".to_string(),
                expected,
                got: self.n_states,
            });
        }
        self.priors.link.validate_for_link("beta")?;
        self.priors.detection.validate_for_probability("p")?;
        if self.statements
            != occupancy_statements(self.n_species, self.priors.link, self.priors.detection)
        {
            return Err(ModelError::StatementMismatch {
                n_species: self.n_species,
            });
        }
        self.data.validate(self.n_states)?;
        self.inits
            .validate(self.data.site_count, self.n_species, self.n_states)?;
        check_reachable(&self.data, &self.inits)
    }

    /// Serialises the model to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ModelError> {
        serde_json::to_string_pretty(self).map_err(|e| ModelError::Serialization {
            reason: e.to_string(),
        })
    }

    /// Parses a specification from JSON and validates it.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let spec: Self = serde_json::from_str(json).map_err(|e| ModelError::Serialization {
            reason: e.to_string(),
        })?;
        spec.validate()?;
        Ok(spec)
    }

    /// Complete-data log posterior (up to a constant) at the given values.
    ///
    /// Sums the priors of `beta` and `p`, the state prior of every `z[i]`,
    /// and the detection likelihood of every `y[i, j]`.
    pub fn log_density(&self, beta: &[f64], p: &[f64], states: &[usize]) -> Result<f64, ModelError> {
        let candidate = InitialValues {
            latent_states: states.to_vec(),
            detection_probs: p.to_vec(),
            link_parameters: beta.to_vec(),
        };
        candidate.validate(self.data.site_count, self.n_species, self.n_states)?;

        let mut total = 0.0;
        for &b in beta {
            total += self.priors.link.log_density(b)?;
        }
        for &ps in p {
            total += self.priors.detection.log_density(ps)?;
        }

        let psi = softmax_with_reference(beta);
        let table = detection_table_from_slice(p);
        for (row, &z) in self.data.observations.iter().zip(states) {
            total += psi[z - 1].ln();
            for &y in row {
                total += table.prob(z, usize::from(y)).ln();
            }
        }
        Ok(total)
    }
}

/// Every observation must be reachable from its site's initial state.
fn check_reachable(data: &DataBundle, inits: &InitialValues) -> Result<(), ModelError> {
    let table = detection_table_from_slice(&inits.detection_probs);
    for (site, (row, &z)) in data.observations.iter().zip(&inits.latent_states).enumerate() {
        if let Some(visit) = row
            .iter()
            .position(|&y| table.prob(z, usize::from(y)) <= 0.0)
        {
            return Err(ModelError::ZeroLikelihoodInit { site, visit });
        }
    }
    Ok(())
}

/// Builds a [`ModelSpec`] for `S` species.
///
/// # Example
///
/// ```
/// use sympatry_model::{ModelBuilder, Prior};
///
/// let builder = ModelBuilder::<2>::new()
///     .with_link_prior(Prior::Normal { mean: 0.0, sd: 2.0 })
///     .with_detection_init([0.4, 0.6]);
/// ```
#[derive(Debug, Clone)]
pub struct ModelBuilder<const S: usize> {
    link_prior: Prior,
    detection_prior: Prior,
    detection_init: [f64; S],
}

impl<const S: usize> ModelBuilder<S> {
    /// Creates a builder with defaults.
    ///
    /// Defaults: `link_prior = Normal(0, 1)`, `detection_prior = Uniform(0, 1)`,
    /// detection initial values 0.5 for every species.
    pub fn new() -> Self {
        Self {
            link_prior: Prior::standard_normal(),
            detection_prior: Prior::unit_uniform(),
            detection_init: [0.5; S],
        }
    }

    /// Sets the prior of every link parameter.
    pub fn with_link_prior(mut self, prior: Prior) -> Self {
        self.link_prior = prior;
        self
    }

    /// Sets the prior of every detection probability.
    pub fn with_detection_prior(mut self, prior: Prior) -> Self {
        self.detection_prior = prior;
        self
    }

    /// Sets the initial detection probabilities.
    pub fn with_detection_init(mut self, init: [f64; S]) -> Self {
        self.detection_init = init;
        self
    }

    /// Assembles and validates the model.
    ///
    /// Initial latent states are the simulated true states, so the sampler
    /// never starts in a configuration that cannot explain a detection.
    /// Initial link parameters are the smoothed log frequency ratios
    /// `ln((n_k + 0.5) / (n_0 + 0.5))` of those states.
    ///
    /// # Errors
    ///
    /// * [`ModelError::DimensionMismatch`] if the occupancy and observation
    ///   matrices disagree on N, or the observations were encoded for a
    ///   different species count.
    /// * [`ModelError::InvalidPrior`] / [`ModelError::InvalidInit`] for bad settings.
    /// * [`ModelError::ZeroLikelihoodInit`] if an observation is impossible
    ///   under the initial state.
    pub fn build(
        &self,
        observations: &ObservationMatrix,
        truth: &OccupancyMatrix<S>,
    ) -> Result<ModelSpec, ModelError> {
        let n_states = n_combinations(S);
        if usize::from(observations.max_code()) != n_states {
            return Err(ModelError::DimensionMismatch {
                what: "observation code range".to_string(),
                expected: n_states,
                got: usize::from(observations.max_code()),
            });
        }
        if truth.n_sites() != observations.n_sites() {
            return Err(ModelError::DimensionMismatch {
                what: "occupancy rows".to_string(),
                expected: observations.n_sites(),
                got: truth.n_sites(),
            });
        }

        let counts = truth.state_counts();
        let reference = counts[0] as f64 + 0.5;
        let link_parameters = counts[1..]
            .iter()
            .map(|&c| ((c as f64 + 0.5) / reference).ln())
            .collect();

        let spec = ModelSpec {
            n_species: S,
            n_states,
            priors: PriorSet {
                link: self.link_prior,
                detection: self.detection_prior,
            },
            statements: occupancy_statements(S, self.link_prior, self.detection_prior),
            data: DataBundle {
                observations: observations.to_rows(),
                site_count: observations.n_sites(),
                visit_count: observations.n_visits(),
            },
            inits: InitialValues {
                latent_states: truth.state_codes(),
                detection_probs: self.detection_init.to_vec(),
                link_parameters,
            },
        };
        spec.validate()?;

        debug!(
            detection_table = ?detection_table(&self.detection_init).rows(),
            "initial detection table"
        );
        info!(
            n_sites = spec.data.site_count,
            n_visits = spec.data.visit_count,
            n_states,
            "model specification built"
        );
        Ok(spec)
    }
}

impl<const S: usize> Default for ModelBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
