//! Occupancy model specification for external Bayesian samplers.
//!
//! Turns simulated detections into a self-contained, serialisable model:
//! a declarative list of statements, the observed data and a set of
//! initial values. Sampling itself happens elsewhere; this crate also reads
//! the resulting draws back and compares them with the simulated truth.
//!
//! # Model
//!
//! ```text
//!  beta[k] ~ prior                    k = 1..2^S-1
//!  psi     = softmax_with_reference(beta)
//!  p[s]    ~ prior                    s = 1..S
//!  z[i]    ~ Categorical(psi)         i = 1..N
//!  y[i,j]  ~ Categorical(obs_prob[z[i]])
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use sympatry_detect::ObservationMatrix;
//! use sympatry_model::ModelBuilder;
//! use sympatry_occupancy::OccupancyMatrix;
//!
//! let truth = OccupancyMatrix::from_rows(vec![[true, false], [true, true]]).unwrap();
//! let observations = ObservationMatrix::from_codes(2, 2, 1, vec![2, 4]).unwrap();
//!
//! let spec = ModelBuilder::<2>::new().build(&observations, &truth).unwrap();
//! assert_eq!(spec.inits.latent_states, vec![2, 4]);
//! assert!(spec.to_json().unwrap().contains("obs_prob"));
//! ```

pub mod builder;
pub mod bundle;
pub mod detection;
pub mod error;
pub mod link;
pub mod posterior;
pub mod prior;
pub mod statement;

pub use builder::{ModelBuilder, ModelSpec, PriorSet};
pub use bundle::{DataBundle, InitialValues};
pub use detection::{DetectionTable, detection_table, detection_table_from_slice};
pub use error::ModelError;
pub use link::{LinkParameters, softmax_with_reference};
pub use posterior::{
    DrawSummary, ParameterComparison, PosteriorDraws, element_name, truth_values,
};
pub use prior::Prior;
pub use statement::{
    Bound, Distribution, Expression, Index, ProbsRef, Statement, occupancy_statements,
};
