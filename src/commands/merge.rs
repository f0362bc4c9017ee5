//! Merge command implementation.
//!
//! The merge command:
//! 1. Selects this job's output files
//! 2. Scans them for the global value range
//! 3. Derives the bin width
//! 4. Re-selects and re-reads the files, binning every record
//! 5. Writes histogram lines (and optionally a JSON report)

use crate::aggregator::{bin_records, scan_range, BinWidth, Histogram, ValueRange};
use crate::output::{component_histograms, write_histogram, write_report, MergeReport};
use crate::selector::{select_files, FileFilter, ShardAssignment};
use crate::utils::config::REPORT_SCHEMA_VERSION;
use crate::utils::error::BinningError;
use anyhow::{Context, Result};
use log::{debug, info};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the merge command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct MergeArgs {
    /// Directory holding worker output files
    pub root_dir: PathBuf,

    /// Bin count, used only as a divisor of the value range
    pub num_bins: f64,

    /// Substring selected file names must contain
    pub prefix: String,

    /// 1-based job id
    pub job_id: u64,

    /// Total number of jobs
    pub num_jobs: u64,

    /// Pinned `(min, max)` range replacing the observed one
    pub range: Option<(f64, f64)>,

    /// Optional JSON report path
    pub report: Option<PathBuf>,
}

impl Default for MergeArgs {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            num_bins: 100.0,
            prefix: String::new(),
            job_id: 1,
            num_jobs: 1,
            range: None,
            report: None,
        }
    }
}

/// Everything a merge run produced
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Files merged in pass 2, in processing order
    pub files: Vec<PathBuf>,

    /// Range observed in pass 1
    pub observed: ValueRange,

    /// Bin width used in pass 2
    pub width: BinWidth,

    pub histogram: Histogram,
}

/// Validate merge arguments
///
/// **Public** - can be called before execute_merge for early validation
///
/// # Returns
/// Ok if arguments are valid, Err with message if not
pub fn validate_args(args: &MergeArgs) -> Result<()> {
    if args.num_bins == 0.0 {
        return Err(BinningError::ZeroBins.into());
    }

    if !args.num_bins.is_finite() {
        return Err(BinningError::NonFiniteBins(args.num_bins).into());
    }

    ShardAssignment::from_one_based(args.job_id, args.num_jobs)?;

    if let Some((min, max)) = args.range {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(BinningError::InvalidRange { min, max }.into());
        }
    }

    if !args.root_dir.is_dir() {
        anyhow::bail!("Root directory does not exist: {}", args.root_dir.display());
    }

    Ok(())
}

/// Run both merge passes without writing anything
///
/// **Public** - library entry point; `execute_merge` adds output
///
/// # Errors
/// * Directory listing or file name errors
/// * Record format errors (with file and line)
/// * Degenerate range or zero bin count
pub fn run_merge(args: &MergeArgs) -> Result<MergeOutcome> {
    let assignment = ShardAssignment::from_one_based(args.job_id, args.num_jobs)?;
    let filter = FileFilter::new(args.prefix.clone(), assignment);

    // Pass 1: range scan
    info!("Pass 1/2: Scanning value range...");
    let files = select_files(&args.root_dir, &filter)
        .with_context(|| format!("Failed to select input files in {}", args.root_dir.display()))?;
    info!("Selected {} file(s) for job {}/{}", files.len(), args.job_id, args.num_jobs);

    let observed = scan_range(&files).context("Failed to scan value range")?;

    let width = derive_width(&observed, args)?;
    info!(
        "Range [{}, {}] over {} records, bin size {}",
        observed.min, observed.max, observed.record_count, width.value()
    );

    // Pass 2: bin and count, selection is evaluated again
    info!("Pass 2/2: Binning records...");
    let files = select_files(&args.root_dir, &filter)
        .with_context(|| format!("Failed to select input files in {}", args.root_dir.display()))?;
    let histogram = bin_records(&files, width).context("Failed to bin records")?;

    debug!("Histogram has {} entries", histogram.len());

    Ok(MergeOutcome {
        files,
        observed,
        width,
        histogram,
    })
}

/// Derive the pass 2 bin width
///
/// **Private** - empty input is rejected even when the range is pinned
fn derive_width(observed: &ValueRange, args: &MergeArgs) -> Result<BinWidth> {
    if observed.is_empty() {
        return Err(BinningError::EmptyRange).with_context(|| {
            format!(
                "No records matched prefix '{}' for job {}/{} in {}",
                args.prefix,
                args.job_id,
                args.num_jobs,
                args.root_dir.display()
            )
        });
    }

    let width = match args.range {
        Some((min, max)) => BinWidth::from_bounds(min, max, args.num_bins)?,
        None => BinWidth::derive(observed, args.num_bins)?,
    };

    Ok(width)
}

/// Execute the merge command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Merge command arguments
/// * `writer` - Destination of the histogram lines (stdout in the CLI)
///
/// # Returns
/// The merge outcome, after all lines were written
pub fn execute_merge<W: Write>(args: &MergeArgs, writer: W) -> Result<MergeOutcome> {
    let start_time = Instant::now();

    info!(
        "Merging '{}' files from {} into {} bins",
        args.prefix,
        args.root_dir.display(),
        args.num_bins
    );

    let outcome = run_merge(args)?;

    let lines = write_histogram(&outcome.histogram, writer)
        .context("Failed to write histogram")?;

    if let Some(report_path) = &args.report {
        let report = build_report(args, &outcome);
        write_report(&report, report_path).context("Failed to write JSON report")?;
    }

    let elapsed = start_time.elapsed();
    info!("Wrote {} histogram lines in {:.2}s", lines, elapsed.as_secs_f64());

    Ok(outcome)
}

/// Build the JSON report for a finished merge
///
/// **Public** - also useful for callers embedding the merger
pub fn build_report(args: &MergeArgs, outcome: &MergeOutcome) -> MergeReport {
    let (min_val, max_val) = args
        .range
        .unwrap_or((outcome.observed.min, outcome.observed.max));

    MergeReport {
        version: REPORT_SCHEMA_VERSION.to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        root_dir: args.root_dir.display().to_string(),
        prefix: args.prefix.clone(),
        job_id: args.job_id,
        num_jobs: args.num_jobs,
        num_bins: args.num_bins,
        files: outcome
            .files
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect(),
        record_count: outcome.observed.record_count,
        min_val,
        max_val,
        bin_size: outcome.width.value(),
        range_pinned: args.range.is_some(),
        components: component_histograms(&outcome.histogram),
    }
}
