//! JSON run report schema.
//!
//! The report is an optional companion to the tab-separated output.
//! It records which files a job merged, the range and bin width it
//! used, and the resulting histogram.

use crate::aggregator::Histogram;
use serde::{Deserialize, Serialize};

/// Complete report for one merge invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergeReport {
    /// Report schema version
    pub version: String,

    /// ISO 8601 timestamp
    pub generated_at: String,

    pub root_dir: String,
    pub prefix: String,

    /// 1-based job id
    pub job_id: u64,
    pub num_jobs: u64,
    pub num_bins: f64,

    /// Names of the merged files, in processing order
    pub files: Vec<String>,

    pub record_count: u64,
    pub min_val: f64,
    pub max_val: f64,
    pub bin_size: f64,

    /// True when `min_val`/`max_val` were supplied instead of observed
    #[serde(default)]
    pub range_pinned: bool,

    pub components: Vec<ComponentHistogram>,
}

/// Histogram of a single component
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentHistogram {
    pub component: String,

    /// Sum of all bin counts
    pub total: u64,

    pub bins: Vec<BinCount>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BinCount {
    pub bin: f64,
    pub count: u64,
}

/// Convert a histogram table into report sections
///
/// **Public** - keeps the table's component and bin order
pub fn component_histograms(histogram: &Histogram) -> Vec<ComponentHistogram> {
    histogram
        .components()
        .map(|component| ComponentHistogram {
            component: String::from_utf8_lossy(component).into_owned(),
            total: histogram.component_total(component),
            bins: histogram
                .bins(component)
                .into_iter()
                .map(|(bin, count)| BinCount { bin, count })
                .collect(),
        })
        .collect()
}
