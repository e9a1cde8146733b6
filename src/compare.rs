//! Compare command: posterior draws against the simulated truth.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use sympatry_model::{ParameterComparison, PosteriorDraws, element_name};

use crate::cli::CompareArgs;
use crate::simulate::TruthRecord;

/// Run the compare command.
pub fn run(args: CompareArgs) -> Result<()> {
    let _cmd = info_span!("compare").entered();

    let truth_str = std::fs::read_to_string(&args.truth)
        .with_context(|| format!("failed to read truth: {}", args.truth.display()))?;
    let truth: TruthRecord =
        serde_json::from_str(&truth_str).context("failed to parse truth JSON")?;

    let draws_str = std::fs::read_to_string(&args.draws)
        .with_context(|| format!("failed to read draws: {}", args.draws.display()))?;
    let draws = PosteriorDraws::from_json(&draws_str).context("failed to parse posterior draws")?;

    let rows = compare(&truth, draws)?;
    let covered = rows.iter().filter(|r| r.covered).count();
    for row in &rows {
        info!(
            parameter = %row.name,
            truth = row.truth,
            median = row.median,
            lower = row.lower,
            upper = row.upper,
            covered = row.covered,
            "posterior summary"
        );
    }
    info!(covered, total = rows.len(), "95% interval coverage");

    if let Some(path) = args.output {
        let json = serde_json::to_string_pretty(&rows)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write comparison: {}", path.display()))?;
        info!(path = %path.display(), "comparison written");
    } else {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    }
    Ok(())
}

/// Summarises every truth parameter that has draws.
///
/// State probabilities are derived from the link parameters when the draws
/// carry `beta` but not `psi`. Truth parameters without draws are skipped.
pub fn compare(truth: &TruthRecord, draws: PosteriorDraws) -> Result<Vec<ParameterComparison>> {
    let has = |name: &str| draws.names().any(|n| n == name);
    let draws = if has(&element_name("beta", 1)) && !has(&element_name("psi", 1)) {
        draws
            .with_derived_psi(truth.joint.len())
            .context("failed to derive psi draws")?
    } else {
        draws
    };

    let (present, missing): (BTreeMap<String, f64>, BTreeMap<String, f64>) = truth
        .parameters
        .iter()
        .map(|(k, &v)| (k.clone(), v))
        .partition(|(name, _)| draws.names().any(|n| n == name));
    if !missing.is_empty() {
        let names: Vec<&String> = missing.keys().collect();
        warn!(?names, "no draws for these parameters");
    }
    if present.is_empty() {
        bail!("draws contain none of the simulated parameters");
    }
    Ok(draws.compare_to_truth(&present)?)
}
