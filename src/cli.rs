use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sympatry co-occurrence simulator.
#[derive(Parser)]
#[command(
    name = "sympatry",
    version,
    about = "Correlated occupancy and detection simulator for multi-species occupancy models"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Solve, sample, detect and write the model specification.
    Simulate(SimulateArgs),
    /// Compare posterior draws with the simulated truth.
    Compare(CompareArgs),
}

/// Arguments for the `simulate` subcommand.
#[derive(clap::Args)]
pub struct SimulateArgs {
    /// Path to TOML configuration file (built-in defaults if omitted).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override model specification JSON path from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override truth JSON path from config.
    #[arg(short, long)]
    pub truth: Option<PathBuf>,

    /// Override global RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,
}

/// Arguments for the `compare` subcommand.
#[derive(clap::Args)]
pub struct CompareArgs {
    /// Truth JSON written by `simulate`.
    #[arg(short, long)]
    pub truth: PathBuf,

    /// Posterior draws JSON: parameter name -> chains x iterations.
    #[arg(short, long)]
    pub draws: PathBuf,

    /// Path for comparison JSON output.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
