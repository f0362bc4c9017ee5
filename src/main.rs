//! Residual Merge CLI
//!
//! Merges the worker output files assigned to one job into
//! per-component residual histograms, printed to stdout as
//! `component\tbin\tcount` lines.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::debug;
use residual_merge::commands::{execute_merge, validate_args, MergeArgs};
use std::io::BufWriter;
use std::path::PathBuf;

/// Residual Merge - per-component histograms from sharded residual files
#[derive(Parser, Debug)]
#[command(name = "residual-merge")]
#[command(version, about, long_about = None)]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// Directory containing worker output files
    root_dir: PathBuf,

    /// Number of bins (divisor of the value range; may be fractional)
    num_bins: f64,

    /// Substring that selected file names must contain
    prefix: String,

    /// 1-based id of this job
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    job_id: u64,

    /// Total number of jobs sharing the directory
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    num_jobs: u64,

    /// Pin the lower bound of the value range
    #[arg(long, requires = "range_max")]
    range_min: Option<f64>,

    /// Pin the upper bound of the value range
    #[arg(long, requires = "range_min")]
    range_max: Option<f64>,

    /// Also write a JSON report to this path
    #[arg(long, env = "RESIDUAL_MERGE_REPORT")]
    report: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging (stderr, so stdout only carries histogram lines)
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    debug!("Arguments: {:?}", cli);

    let args = MergeArgs {
        root_dir: cli.root_dir,
        num_bins: cli.num_bins,
        prefix: cli.prefix,
        job_id: cli.job_id,
        num_jobs: cli.num_jobs,
        range: cli.range_min.zip(cli.range_max),
        report: cli.report,
    };

    // Validate args first
    validate_args(&args)?;

    let stdout = std::io::stdout();
    execute_merge(&args, BufWriter::new(stdout.lock()))?;

    Ok(())
}
