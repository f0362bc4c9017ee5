//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod merge;

// Re-export main command functions
pub use merge::{build_report, execute_merge, run_merge, validate_args, MergeArgs, MergeOutcome};
