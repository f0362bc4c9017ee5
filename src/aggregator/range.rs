//! Pass 1: global value range across the selected files.

use crate::parser::{read_records, Record};
use crate::utils::error::ParseError;
use log::debug;
use std::path::PathBuf;

/// Running minimum and maximum of observed residuals
///
/// **Public** - produced by pass 1, consumed by bin width derivation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    /// Smallest residual seen (`+inf` until the first record)
    pub min: f64,

    /// Largest residual seen (`-inf` until the first record)
    pub max: f64,

    /// Number of records observed
    pub record_count: u64,
}

impl Default for ValueRange {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            record_count: 0,
        }
    }
}

impl ValueRange {
    pub fn observe(&mut self, residual: f64) {
        self.min = self.min.min(residual);
        self.max = self.max.max(residual);
        self.record_count += 1;
    }

    pub fn observe_all<'a>(&mut self, records: impl IntoIterator<Item = &'a Record>) {
        for record in records {
            self.observe(record.residual);
        }
    }

    /// True until at least one residual has been observed
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Scan every selected file and compute the global range
///
/// **Public** - pass 1 entry point
///
/// # Arguments
/// * `files` - Selected input files
///
/// # Returns
/// Range over every record of every file (empty if there were none)
///
/// # Errors
/// Any read or record format error aborts the scan
pub fn scan_range(files: &[PathBuf]) -> Result<ValueRange, ParseError> {
    let mut range = ValueRange::default();

    for path in files {
        let records = read_records(path)?;
        range.observe_all(&records);
    }

    debug!(
        "Range over {} records: [{}, {}]",
        range.record_count, range.min, range.max
    );

    Ok(range)
}
