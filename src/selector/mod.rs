//! Input file selection.
//!
//! This module decides which worker output files a merge job reads:
//! - Name filtering (output marker and prefix)
//! - Shard id extraction from file names
//! - Modulo-based job assignment

pub mod files;
pub mod shard;

// Re-export main types and functions
pub use files::{select_files, FileFilter};
pub use shard::{extract_shard_id, ShardAssignment};
