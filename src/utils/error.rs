//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while selecting input files
#[derive(Error, Debug)]
pub enum SelectError {
    #[error("Cannot read directory {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot extract shard id from file name '{file_name}': '{shard_text}' is not an integer")]
    MalformedFileName {
        file_name: String,
        shard_text: String,
    },

    #[error("Shard id '{shard_text}' in file name '{file_name}' is out of range")]
    ShardIdOutOfRange {
        file_name: String,
        shard_text: String,
    },

    #[error("Number of jobs must be at least 1")]
    ZeroJobs,

    #[error("Job id {job_id} is out of range for {num_jobs} job(s)")]
    JobOutOfRange { job_id: u64, num_jobs: u64 },
}

/// Errors that can occur while parsing input records
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: expected 2 tab-separated fields, found {found}")]
    FieldCount {
        path: PathBuf,
        line: usize,
        found: usize,
    },

    #[error("{path}:{line}: residual '{value}' is not a number")]
    InvalidResidual {
        path: PathBuf,
        line: usize,
        value: String,
    },

    #[error("{path}:{line}: residual '{value}' is not finite")]
    NonFiniteResidual {
        path: PathBuf,
        line: usize,
        value: String,
    },
}

/// Errors that can occur while deriving bin widths and binning
#[derive(Error, Debug, PartialEq)]
pub enum BinningError {
    #[error("Number of bins must be non-zero")]
    ZeroBins,

    #[error("Number of bins must be finite, got {0}")]
    NonFiniteBins(f64),

    #[error("No records found in the selected files; value range is undefined")]
    EmptyRange,

    #[error("All residuals equal {0}; bin width would be zero")]
    ZeroWidth(f64),

    #[error("Invalid value range: min {min} must be below max {max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("Derived bin width {0} is not usable")]
    InvalidWidth(f64),
}

/// Errors that can occur during output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Failed to write report {path}: {source}")]
    ReportFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
