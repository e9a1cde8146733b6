//! Imperfect-detection simulation and categorical observation encoding.
//!
//! Each site is visited `J` times. On every visit each present species is
//! detected independently with its own probability; absent species are
//! never detected. The per-species outcomes of one visit are folded into a
//! single categorical code (see [`code`]).
//!
//! # Pipeline
//!
//! ```text
//!  ┌───────────────────┐     ┌───────────────────────┐     ┌─────────────────────┐
//!  │  OccupancyMatrix  │────▶│  simulate_detections  │────▶│  ObservationMatrix  │
//!  │  (N x S, latent)  │     │  (Bernoulli trials)   │     │  (N x J codes)      │
//!  └───────────────────┘     └───────────────────────┘     └─────────────────────┘
//! ```

pub mod code;
pub mod error;
pub mod observation;
pub mod simulate;

pub use code::{MAX_SPECIES, decode, encode, max_code};
pub use error::DetectError;
pub use observation::ObservationMatrix;
pub use simulate::{DetectionHistory, DetectionProbs, simulate_detections};
