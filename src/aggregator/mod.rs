//! Two-pass aggregation of residual records into histograms.
//!
//! This module provides:
//! - Pass 1: global value range scan
//! - Bin width derivation from the range
//! - Pass 2: per-component binned counts

pub mod histogram;
pub mod range;

// Re-export main types and functions
pub use histogram::{bin_records, BinKey, BinWidth, Histogram, HistogramEntry};
pub use range::{scan_range, ValueRange};
