//! Residual Merge
//!
//! Merges sharded residual output files into per-component
//! histograms.
//!
//! Worker jobs write `<residual>\t<component>` lines into files named
//! `<prefix>..._<shard>.out`. A merge job picks the shards assigned to
//! it, finds the global value range, and counts residuals into
//! fixed-width bins per component.
//!
//! ## Getting Started
//!
//! ```bash
//! residual-merge <ROOT_DIR> <NUM_BINS> <PREFIX> <JOB_ID> <NUM_JOBS>
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod selector;
pub mod utils;
