//! Latent occupancy matrix: one presence vector per site.

use sympatry_joint::{combination_index, n_combinations};

use crate::error::OccupancyError;

/// True presence/absence of `S` species at `N` sites.
///
/// Rows are sites; each row is one draw from the joint table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyMatrix<const S: usize> {
    rows: Vec<[bool; S]>,
}

impl<const S: usize> OccupancyMatrix<S> {
    /// Wraps existing presence rows.
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::ZeroSites`] if `rows` is empty.
    pub fn from_rows(rows: Vec<[bool; S]>) -> Result<Self, OccupancyError> {
        if rows.is_empty() {
            return Err(OccupancyError::ZeroSites);
        }
        Ok(Self { rows })
    }

    /// Number of sites (N).
    pub fn n_sites(&self) -> usize {
        self.rows.len()
    }

    /// Number of species (S).
    pub fn n_species(&self) -> usize {
        S
    }

    /// Presence vector of one site.
    pub fn row(&self, site: usize) -> &[bool; S] {
        &self.rows[site]
    }

    /// All presence vectors.
    pub fn rows(&self) -> &[[bool; S]] {
        &self.rows
    }

    /// Whether `species` is present at `site`.
    pub fn is_present(&self, site: usize, species: usize) -> bool {
        self.rows[site][species]
    }

    /// Combination index of a site's presence vector.
    pub fn state_index(&self, site: usize) -> usize {
        combination_index(&self.rows[site])
    }

    /// Categorical state code (1-based) of a site.
    pub fn state_code(&self, site: usize) -> usize {
        self.state_index(site) + 1
    }

    /// Categorical state codes of all sites.
    pub fn state_codes(&self) -> Vec<usize> {
        (0..self.n_sites()).map(|i| self.state_code(i)).collect()
    }

    /// Presence column of a single species.
    pub fn species_column(&self, species: usize) -> Vec<bool> {
        self.rows.iter().map(|r| r[species]).collect()
    }

    /// Number of sites in each combination, indexed by combination.
    pub fn state_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; n_combinations(S)];
        for row in &self.rows {
            counts[combination_index(row)] += 1;
        }
        counts
    }

    /// Observed frequency of each combination.
    pub fn empirical_table(&self) -> Vec<f64> {
        let n = self.n_sites() as f64;
        self.state_counts()
            .into_iter()
            .map(|c| c as f64 / n)
            .collect()
    }
}
