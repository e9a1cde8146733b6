//! Error types for the sympatry-detect crate.

/// Error type for all fallible operations in the sympatry-detect crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DetectError {
    /// Returned when a detection probability is outside [0, 1].
    #[error("invalid detection probability for species {species}: {value} (must be in [0, 1])")]
    InvalidProbability {
        /// Zero-based species index.
        species: usize,
        /// The invalid value.
        value: f64,
    },

    /// Returned when observation codes cannot represent the species count.
    #[error("unsupported number of species: {n_species} (must be in 1..={max})")]
    InvalidSpeciesCount {
        /// The requested number of species.
        n_species: usize,
        /// Largest supported number of species.
        max: usize,
    },

    /// Returned when zero visits per site are requested.
    #[error("number of visits must be at least 1")]
    ZeroVisits,

    /// Returned when an observation matrix has no sites.
    #[error("number of sites must be at least 1")]
    ZeroSites,

    /// Returned when an observation code is outside 1..=max.
    #[error("invalid observation code {code} (must be in 1..={max})")]
    InvalidCode {
        /// The invalid code.
        code: u8,
        /// Largest valid code.
        max: u8,
    },

    /// Returned when a code buffer does not match the declared dimensions.
    #[error("dimension mismatch: expected {expected} codes, got {got}")]
    DimensionMismatch {
        /// Expected number of codes (sites x visits).
        expected: usize,
        /// Actual number of codes.
        got: usize,
    },
}
