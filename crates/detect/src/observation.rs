//! Encoded site-by-visit observation matrix.

use crate::code::{MAX_SPECIES, max_code};
use crate::error::DetectError;

/// N x J matrix of categorical observation codes, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationMatrix {
    n_sites: usize,
    n_visits: usize,
    max_code: u8,
    codes: Vec<u8>,
}

impl ObservationMatrix {
    /// Builds a validated observation matrix for `n_species` species.
    ///
    /// # Errors
    ///
    /// * [`DetectError::InvalidSpeciesCount`] unless `n_species` is in `1..=MAX_SPECIES`.
    /// * [`DetectError::ZeroSites`] / [`DetectError::ZeroVisits`] for empty dimensions.
    /// * [`DetectError::DimensionMismatch`] if `codes.len() != n_sites * n_visits`.
    /// * [`DetectError::InvalidCode`] for any code outside `1..=2^S`.
    pub fn from_codes(
        n_species: usize,
        n_sites: usize,
        n_visits: usize,
        codes: Vec<u8>,
    ) -> Result<Self, DetectError> {
        let max = max_code(n_species).ok_or(DetectError::InvalidSpeciesCount {
            n_species,
            max: MAX_SPECIES,
        })?;
        if n_sites == 0 {
            return Err(DetectError::ZeroSites);
        }
        if n_visits == 0 {
            return Err(DetectError::ZeroVisits);
        }
        if codes.len() != n_sites * n_visits {
            return Err(DetectError::DimensionMismatch {
                expected: n_sites * n_visits,
                got: codes.len(),
            });
        }
        if let Some(&code) = codes.iter().find(|&&c| c == 0 || c > max) {
            return Err(DetectError::InvalidCode { code, max });
        }
        Ok(Self {
            n_sites,
            n_visits,
            max_code: max,
            codes,
        })
    }

    /// Number of sites (N).
    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    /// Number of visits per site (J).
    pub fn n_visits(&self) -> usize {
        self.n_visits
    }

    /// Largest admissible code (`2^S`).
    pub fn max_code(&self) -> u8 {
        self.max_code
    }

    /// Code observed at `site` on `visit`.
    pub fn get(&self, site: usize, visit: usize) -> u8 {
        self.codes[site * self.n_visits + visit]
    }

    /// All visits of one site.
    pub fn row(&self, site: usize) -> &[u8] {
        let start = site * self.n_visits;
        &self.codes[start..start + self.n_visits]
    }

    /// All codes, row-major.
    pub fn codes(&self) -> &[u8] {
        &self.codes
    }

    /// Rows as nested vectors, the layout of the sampler data bundle.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.codes
            .chunks(self.n_visits)
            .map(<[u8]>::to_vec)
            .collect()
    }
}
