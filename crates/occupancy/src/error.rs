//! Error types for the sympatry-occupancy crate.

/// Error type for all fallible operations in the sympatry-occupancy crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OccupancyError {
    /// Returned when zero sites are requested.
    #[error("number of sites must be at least 1")]
    ZeroSites,

    /// Returned when a pre-allocated buffer has the wrong length.
    #[error("buffer length mismatch: expected {expected}, got {got}")]
    BufferLengthMismatch {
        /// Expected buffer length.
        expected: usize,
        /// Actual buffer length.
        got: usize,
    },
}
