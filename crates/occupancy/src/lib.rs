//! Correlated binary occupancy sampling.
//!
//! Draws i.i.d. site-level presence vectors from a joint co-occurrence
//! table. Each draw is a categorical draw over the `2^S` combinations,
//! mapped back to its presence bits, so species within a site are
//! correlated exactly as the table prescribes while sites are independent.
//!
//! # Quick start
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use sympatry_joint::{Marginals, OddsRatios, SolverConfig, solve_joint};
//! use sympatry_occupancy::sample_occupancy;
//!
//! let table = solve_joint(
//!     &Marginals::new([0.3, 0.6]).unwrap(),
//!     &OddsRatios::pair(0.5).unwrap(),
//!     &SolverConfig::new(),
//! )
//! .unwrap();
//! let mut rng = StdRng::seed_from_u64(1);
//! let occupancy = sample_occupancy(&table, 100, &mut rng).unwrap();
//! assert_eq!(occupancy.n_sites(), 100);
//! ```

pub mod error;
pub mod matrix;
pub mod sample;

pub use error::OccupancyError;
pub use matrix::OccupancyMatrix;
pub use sample::{sample_combination, sample_occupancy, sample_occupancy_into};
