//! Output writers for merged histograms.
//!
//! This module handles:
//! - Tab-separated histogram lines (stdout)
//! - Optional JSON run reports

pub mod report;
pub mod schema;
pub mod tsv;

// Re-export main functions
pub use report::{render_report, write_report};
pub use schema::{component_histograms, BinCount, ComponentHistogram, MergeReport};
pub use tsv::{format_bin_value, format_entry, write_histogram};
