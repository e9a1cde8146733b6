//! Joint co-occurrence distribution from marginal occupancy and odds ratios.
//!
//! Given the probability that each species occupies a site and the pairwise
//! odds ratios between species, this crate reconstructs the full
//! distribution over all `2^S` presence/absence combinations.
//!
//! # Pipeline
//!
//! ```text
//!  ┌───────────────┐     ┌──────────────────┐     ┌───────────────┐
//!  │  marginals    │────▶│  solve_joint     │────▶│  JointTable   │
//!  │  odds ratios  │     │  (closed / IPF)  │     │  (2^S cells)  │
//!  └───────────────┘     └──────────────────┘     └───────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use sympatry_joint::{Marginals, OddsRatios, SolverConfig, solve_joint};
//!
//! let marginals = Marginals::new([0.3, 0.6]).unwrap();
//! let odds = OddsRatios::pair(2.5).unwrap();
//! let table = solve_joint(&marginals, &odds, &SolverConfig::new()).unwrap();
//!
//! assert!((table.marginal(0) - 0.3).abs() < 1e-9);
//! assert!((table.odds_ratio(0, 1) - 2.5).abs() < 1e-6);
//! ```

pub mod config;
pub mod error;
pub mod inputs;
pub mod solve;
pub mod table;

pub use config::SolverConfig;
pub use error::JointError;
pub use inputs::{Marginals, OddsRatios, odds_ratio_from_conditionals};
pub use solve::{pair_joint, solve_joint};
pub use table::{
    JointTable, checked_combinations, combination_bits, combination_index, is_present,
    n_combinations,
};
