//! Simulate command: solve -> sample -> detect -> build.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use sympatry_detect::{DetectionProbs, simulate_detections};
use sympatry_joint::{Marginals, OddsRatios, SolverConfig, solve_joint};
use sympatry_model::{InitialValues, LinkParameters, ModelBuilder, ModelSpec, truth_values};
use sympatry_occupancy::sample_occupancy;

use crate::cli::SimulateArgs;
use crate::config::{OutputToml, SympatryConfig};
use crate::convert;

/// Simulated quantities kept for later comparison with posterior draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthRecord {
    /// Seed of the run, `None` when drawn from the OS.
    pub seed: Option<u64>,
    /// Solved joint table, indexed by combination.
    pub joint: Vec<f64>,
    /// Scalar parameters keyed as in posterior draws (`beta[k]`, `psi[k]`, `p[s]`).
    pub parameters: BTreeMap<String, f64>,
    /// Sites in each latent state.
    pub state_counts: Vec<usize>,
    /// Fraction of sites with at least one detection, per species.
    pub naive_occupancy: Vec<f64>,
}

/// Everything one simulation run writes.
pub struct Artifacts {
    /// Model handed to the sampler.
    pub spec: ModelSpec,
    /// Simulated values for later comparison.
    pub truth: TruthRecord,
    /// Extra jittered initial values, one per chain beyond the first.
    pub chain_inits: Vec<InitialValues>,
}

/// Run the simulate command.
pub fn run(args: SimulateArgs) -> Result<()> {
    let _cmd = info_span!("simulate").entered();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(path) = args.output {
        config.output.spec = path;
    }
    if let Some(path) = args.truth {
        config.output.truth = path;
    }

    let artifacts = run_pipeline(&config)?;
    write_artifacts(&config.output, &artifacts)
}

/// Reads the TOML config, or the built-in defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<SympatryConfig> {
    let Some(path) = path else {
        return Ok(SympatryConfig::default());
    };
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&toml_str).context("failed to parse TOML config")
}

/// Dispatches on the species count given by the marginals.
pub fn run_pipeline(config: &SympatryConfig) -> Result<Artifacts> {
    match config.occupancy.marginals.len() {
        1 => simulate::<1>(config),
        2 => simulate::<2>(config),
        3 => simulate::<3>(config),
        4 => simulate::<4>(config),
        n => Err(anyhow!("unsupported species count {n}: expected 1 to 4"))
            .context("invalid parameter"),
    }
}

/// Validated inputs of one run.
struct Inputs<const S: usize> {
    marginals: Marginals<S>,
    odds: OddsRatios<S>,
    solver: SolverConfig,
    probs: DetectionProbs<S>,
    builder: ModelBuilder<S>,
}

fn build_inputs<const S: usize>(config: &SympatryConfig) -> Result<Inputs<S>> {
    convert::validate_survey(&config.survey)?;
    let marginals = convert::build_marginals::<S>(&config.occupancy)?;
    let odds = convert::build_odds_ratios::<S>(&config.occupancy)?;
    let solver = convert::build_solver_config(&config.solver)?;
    let probs = DetectionProbs::new(convert::to_array::<S>(
        &config.detection.probs,
        "detection.probs",
    )?)?;
    let mut builder = ModelBuilder::<S>::new()
        .with_link_prior(convert::build_link_prior(&config.priors))
        .with_detection_prior(convert::build_detection_prior(&config.priors)?);
    if let Some(init) = &config.detection.init {
        builder = builder.with_detection_init(convert::to_array::<S>(init, "detection.init")?);
    }
    Ok(Inputs {
        marginals,
        odds,
        solver,
        probs,
        builder,
    })
}

fn simulate<const S: usize>(config: &SympatryConfig) -> Result<Artifacts> {
    let Inputs {
        marginals,
        odds,
        solver,
        probs,
        builder,
    } = build_inputs::<S>(config).context("invalid parameter")?;

    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };

    let table = solve_joint(&marginals, &odds, &solver).context("solve stage failed")?;
    info!(n_species = S, joint = ?table.probs(), "joint table solved");
    if let Some((absent, present)) = convert::conditional_mismatch(&config.occupancy, &table) {
        warn!(
            given_absent_gap = absent,
            given_present_gap = present,
            "reverse conditionals are inconsistent with the solved table; ignoring them"
        );
    }

    let occupancy =
        sample_occupancy(&table, config.survey.n_sites, &mut rng).context("sample stage failed")?;
    let state_counts = occupancy.state_counts();
    info!(n_sites = occupancy.n_sites(), ?state_counts, "latent occupancy sampled");

    let history = simulate_detections(&occupancy, &probs, config.survey.n_visits, &mut rng)
        .context("detect stage failed")?;
    let naive_occupancy: Vec<f64> = (0..S).map(|s| history.naive_occupancy(s)).collect();
    info!(
        n_visits = config.survey.n_visits,
        ?naive_occupancy,
        "detections simulated"
    );

    let spec = builder
        .build(history.observations(), &occupancy)
        .context("build stage failed")?;
    let chain_inits = (1..config.output.chains)
        .map(|_| spec.inits.jittered(config.output.jitter_sd, &mut rng))
        .collect::<Result<Vec<_>, _>>()
        .context("build stage failed")?;
    let link = LinkParameters::from_joint(&table).context("build stage failed")?;

    let truth = TruthRecord {
        seed: config.seed,
        joint: table.probs().to_vec(),
        parameters: truth_values(&link, probs.as_array()),
        state_counts,
        naive_occupancy,
    };
    Ok(Artifacts {
        spec,
        truth,
        chain_inits,
    })
}

/// Serialises everything before touching the filesystem.
fn write_artifacts(output: &OutputToml, artifacts: &Artifacts) -> Result<()> {
    let spec_json = artifacts.spec.to_json()?;
    let truth_json = serde_json::to_string_pretty(&artifacts.truth)?;
    let inits_json = if artifacts.chain_inits.is_empty() {
        None
    } else {
        let mut all = vec![artifacts.spec.inits.clone()];
        all.extend(artifacts.chain_inits.iter().cloned());
        Some(serde_json::to_string_pretty(&all)?)
    };

    std::fs::write(&output.spec, spec_json)
        .with_context(|| format!("failed to write model spec: {}", output.spec.display()))?;
    info!(path = %output.spec.display(), "model specification written");
    std::fs::write(&output.truth, truth_json)
        .with_context(|| format!("failed to write truth: {}", output.truth.display()))?;
    info!(path = %output.truth.display(), "truth written");
    if let Some(json) = inits_json {
        std::fs::write(&output.inits, json)
            .with_context(|| format!("failed to write inits: {}", output.inits.display()))?;
        info!(
            path = %output.inits.display(),
            n_chains = artifacts.chain_inits.len() + 1,
            "chain initial values written"
        );
    }
    Ok(())
}
