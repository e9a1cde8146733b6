//! Imperfect-detection simulation over a latent occupancy matrix.

use rand::distr::{Bernoulli, Distribution};
use sympatry_occupancy::OccupancyMatrix;
use tracing::debug;

use crate::code::encode;
use crate::error::DetectError;
use crate::observation::ObservationMatrix;

/// Per-visit detection probability of each species when present.
///
/// Absent species are never detected (no false positives).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionProbs<const S: usize> {
    probs: [f64; S],
}

impl<const S: usize> DetectionProbs<S> {
    /// Creates validated detection probabilities.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::InvalidProbability`] for any entry outside `[0, 1]`.
    pub fn new(probs: [f64; S]) -> Result<Self, DetectError> {
        for (species, &value) in probs.iter().enumerate() {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(DetectError::InvalidProbability { species, value });
            }
        }
        Ok(Self { probs })
    }

    /// Detection probability of one species.
    pub fn get(&self, species: usize) -> f64 {
        self.probs[species]
    }

    /// All detection probabilities.
    pub fn as_array(&self) -> &[f64; S] {
        &self.probs
    }
}

/// Raw per-species detections together with their encoded observation codes.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionHistory<const S: usize> {
    raw: [Vec<u8>; S],
    observations: ObservationMatrix,
}

impl<const S: usize> DetectionHistory<S> {
    /// Raw N x J binary detection matrix of one species, row-major.
    pub fn raw(&self, species: usize) -> &[u8] {
        &self.raw[species]
    }

    /// Whether `species` was detected at `site` on `visit`.
    pub fn detected(&self, species: usize, site: usize, visit: usize) -> bool {
        self.raw[species][site * self.observations.n_visits() + visit] == 1
    }

    /// Encoded observation matrix.
    pub fn observations(&self) -> &ObservationMatrix {
        &self.observations
    }

    /// Consumes the history, keeping only the encoded observations.
    pub fn into_observations(self) -> ObservationMatrix {
        self.observations
    }

    /// Fraction of sites where `species` was detected on at least one visit.
    pub fn naive_occupancy(&self, species: usize) -> f64 {
        let n_visits = self.observations.n_visits();
        let n_sites = self.observations.n_sites();
        let hits = self.raw[species]
            .chunks(n_visits)
            .filter(|visits| visits.contains(&1))
            .count();
        hits as f64 / n_sites as f64
    }
}

/// Simulates repeat-visit detections for every site and species.
///
/// For each site, visit and species (in that order) one Bernoulli trial is
/// drawn with success probability `present * p`, so an absent species is
/// never detected. Each site/visit tuple is then folded into its
/// observation code with [`encode`]. The occupancy matrix is only read.
///
/// # Errors
///
/// Returns [`DetectError::ZeroVisits`] if `n_visits == 0`.
pub fn simulate_detections<const S: usize>(
    occupancy: &OccupancyMatrix<S>,
    probs: &DetectionProbs<S>,
    n_visits: usize,
    rng: &mut impl rand::Rng,
) -> Result<DetectionHistory<S>, DetectError> {
    if n_visits == 0 {
        return Err(DetectError::ZeroVisits);
    }
    let trials = probs
        .as_array()
        .iter()
        .enumerate()
        .map(|(species, &p)| {
            Bernoulli::new(p).map_err(|_| DetectError::InvalidProbability { species, value: p })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let n_sites = occupancy.n_sites();
    let mut raw: [Vec<u8>; S] = std::array::from_fn(|_| vec![0u8; n_sites * n_visits]);
    let mut codes = Vec::with_capacity(n_sites * n_visits);

    for (site, present) in occupancy.rows().iter().enumerate() {
        for visit in 0..n_visits {
            let mut bits = [false; S];
            for s in 0..S {
                bits[s] = present[s] && trials[s].sample(rng);
                raw[s][site * n_visits + visit] = u8::from(bits[s]);
            }
            codes.push(encode(bits));
        }
    }

    debug!(n_sites, n_visits, "simulated detections");
    let observations = ObservationMatrix::from_codes(S, n_sites, n_visits, codes)?;
    Ok(DetectionHistory { raw, observations })
}
