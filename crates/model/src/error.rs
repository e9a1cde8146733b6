//! Error types for the sympatry-model crate.

/// Error type for all fallible operations in the sympatry-model crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    /// Returned when two declared dimensions disagree.
    #[error("dimension mismatch for {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// What was being measured.
        what: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when the species count cannot be encoded.
    #[error("unsupported number of species: {n_species} (must be in 1..={max})")]
    InvalidSpeciesCount {
        /// The declared number of species.
        n_species: usize,
        /// Largest supported number of species.
        max: usize,
    },

    /// Returned when the statements differ from the model implied by the
    /// species count and priors.
    #[error("statements do not describe the {n_species}-species occupancy model with the declared priors")]
    StatementMismatch {
        /// The declared number of species.
        n_species: usize,
    },

    /// Returned when a state or observation code is outside `1..=max`.
    #[error("invalid {what} code {code} (must be in 1..={max})")]
    InvalidCode {
        /// Which kind of code.
        what: String,
        /// The invalid code.
        code: usize,
        /// Largest valid code.
        max: usize,
    },

    /// Returned when a prior is malformed or has the wrong support for its parameter.
    #[error("invalid prior for {parameter}: {reason}")]
    InvalidPrior {
        /// Parameter symbol.
        parameter: String,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when an initial value is outside its parameter's support.
    #[error("invalid initial value for {parameter}: {reason}")]
    InvalidInit {
        /// Parameter symbol.
        parameter: String,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the initial latent states cannot produce an observation.
    #[error("initial state of site {site} gives zero probability to visit {visit}")]
    ZeroLikelihoodInit {
        /// Zero-based site index.
        site: usize,
        /// Zero-based visit index.
        visit: usize,
    },

    /// Returned when a posterior parameter name is not present in the draws.
    #[error("unknown parameter: {name}")]
    UnknownParameter {
        /// The requested name.
        name: String,
    },

    /// Returned when a parameter has no usable draws.
    #[error("no finite draws for parameter {name}")]
    EmptyDraws {
        /// Parameter name.
        name: String,
    },

    /// Returned when JSON (de)serialization fails.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the failure.
        reason: String,
    },
}
