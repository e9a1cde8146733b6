use std::path::PathBuf;

use serde::Deserialize;

/// Top-level sympatry configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SympatryConfig {
    /// Global RNG seed.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Marginal occupancy and species association.
    #[serde(default)]
    pub occupancy: OccupancyToml,

    /// Survey design.
    #[serde(default)]
    pub survey: SurveyToml,

    /// Detection process.
    #[serde(default)]
    pub detection: DetectionToml,

    /// Joint solver settings.
    #[serde(default)]
    pub solver: SolverToml,

    /// Priors of the generated model.
    #[serde(default)]
    pub priors: PriorsToml,

    /// Output paths.
    #[serde(default)]
    pub output: OutputToml,
}

/// Association is given by at most one of `odds_ratio`, `odds_ratios` or
/// `conditionals`; none means independent species.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OccupancyToml {
    #[serde(default = "default_marginals")]
    pub marginals: Vec<f64>,
    #[serde(default)]
    pub odds_ratio: Option<f64>,
    #[serde(default)]
    pub odds_ratios: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub conditionals: Option<ConditionalsToml>,
}

impl Default for OccupancyToml {
    fn default() -> Self {
        Self {
            marginals: default_marginals(),
            odds_ratio: None,
            odds_ratios: None,
            conditionals: Some(ConditionalsToml {
                given_absent: 0.6,
                given_present: 0.1,
                reverse: None,
            }),
        }
    }
}

fn default_marginals() -> Vec<f64> {
    vec![40.0 / 175.0, 85.0 / 175.0]
}

/// `P(z2 = 1 | z1 = 0)` and `P(z2 = 1 | z1 = 1)` for a species pair.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionalsToml {
    pub given_absent: f64,
    pub given_present: f64,
    /// Optional `P(z1 = 1 | z2 = 0)` and `P(z1 = 1 | z2 = 1)`, only checked
    /// against the solved table.
    #[serde(default)]
    pub reverse: Option<ReverseToml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReverseToml {
    pub given_absent: f64,
    pub given_present: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurveyToml {
    #[serde(default = "default_n_sites")]
    pub n_sites: usize,
    #[serde(default = "default_n_visits")]
    pub n_visits: usize,
}

impl Default for SurveyToml {
    fn default() -> Self {
        Self {
            n_sites: default_n_sites(),
            n_visits: default_n_visits(),
        }
    }
}

fn default_n_sites() -> usize {
    500
}
fn default_n_visits() -> usize {
    5
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectionToml {
    #[serde(default = "default_detection_probs")]
    pub probs: Vec<f64>,
    /// Initial detection probabilities handed to the sampler (default 0.5 each).
    #[serde(default)]
    pub init: Option<Vec<f64>>,
}

impl Default for DetectionToml {
    fn default() -> Self {
        Self {
            probs: default_detection_probs(),
            init: None,
        }
    }
}

fn default_detection_probs() -> Vec<f64> {
    vec![0.5, 0.9]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverToml {
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
}

impl Default for SolverToml {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_iter: default_max_iter(),
        }
    }
}

fn default_tolerance() -> f64 {
    1e-10
}
fn default_max_iter() -> usize {
    1000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PriorsToml {
    /// Standard deviation of the zero-mean normal link prior.
    #[serde(default = "default_link_sd")]
    pub link_sd: f64,
    /// `"uniform"` or `"beta"`.
    #[serde(default = "default_detection_prior")]
    pub detection: String,
    #[serde(default = "default_shape")]
    pub beta_alpha: f64,
    #[serde(default = "default_shape")]
    pub beta_beta: f64,
}

impl Default for PriorsToml {
    fn default() -> Self {
        Self {
            link_sd: default_link_sd(),
            detection: default_detection_prior(),
            beta_alpha: default_shape(),
            beta_beta: default_shape(),
        }
    }
}

fn default_link_sd() -> f64 {
    1.0
}
fn default_detection_prior() -> String {
    "uniform".to_string()
}
fn default_shape() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputToml {
    #[serde(default = "default_spec_path")]
    pub spec: PathBuf,
    #[serde(default = "default_truth_path")]
    pub truth: PathBuf,
    /// Number of initial-value sets; more than one writes `inits`.
    #[serde(default = "default_chains")]
    pub chains: usize,
    #[serde(default = "default_jitter_sd")]
    pub jitter_sd: f64,
    #[serde(default = "default_inits_path")]
    pub inits: PathBuf,
}

impl Default for OutputToml {
    fn default() -> Self {
        Self {
            spec: default_spec_path(),
            truth: default_truth_path(),
            chains: default_chains(),
            jitter_sd: default_jitter_sd(),
            inits: default_inits_path(),
        }
    }
}

fn default_spec_path() -> PathBuf {
    PathBuf::from("model.json")
}
fn default_truth_path() -> PathBuf {
    PathBuf::from("truth.json")
}
fn default_chains() -> usize {
    1
}
fn default_jitter_sd() -> f64 {
    0.5
}
fn default_inits_path() -> PathBuf {
    PathBuf::from("inits.json")
}
