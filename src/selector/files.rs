//! Directory scanning and the file selection predicate.

use super::shard::{extract_shard_id, ShardAssignment};
use crate::utils::config::OUTPUT_FILE_MARKER;
use crate::utils::error::SelectError;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Filename filter for one merge invocation
///
/// **Public** - shared by both merge passes
#[derive(Debug, Clone)]
pub struct FileFilter {
    /// Substring the file name must contain
    pub prefix: String,

    /// Shards owned by this job
    pub assignment: ShardAssignment,
}

impl FileFilter {
    pub fn new(prefix: impl Into<String>, assignment: ShardAssignment) -> Self {
        Self {
            prefix: prefix.into(),
            assignment,
        }
    }

    /// Substring checks only (marker and prefix)
    ///
    /// **Public** - names failing this are never shard-parsed
    pub fn is_candidate(&self, file_name: &str) -> bool {
        file_name.contains(OUTPUT_FILE_MARKER) && file_name.contains(&self.prefix)
    }

    /// Full predicate on a file name
    ///
    /// **Public** - candidate names must carry a parseable shard id
    ///
    /// # Returns
    /// `Ok(true)` if the file belongs to this job, `Ok(false)` if it is
    /// not a candidate or belongs to another job
    ///
    /// # Errors
    /// * `SelectError::MalformedFileName` - candidate name without a shard id
    pub fn accepts(&self, file_name: &str) -> Result<bool, SelectError> {
        if !self.is_candidate(file_name) {
            return Ok(false);
        }

        let shard_id = extract_shard_id(file_name)?;
        Ok(self.assignment.owns(shard_id))
    }
}

/// Select the files under `root_dir` that this job must merge
///
/// **Public** - evaluated afresh by each pass
///
/// # Arguments
/// * `root_dir` - Directory holding worker output files
/// * `filter` - Name filter and shard assignment
///
/// # Returns
/// Selected paths sorted for a stable processing order
///
/// # Errors
/// * `SelectError::DirectoryUnreadable` - listing failed
/// * `SelectError::MalformedFileName` - a candidate has no shard id
pub fn select_files(root_dir: &Path, filter: &FileFilter) -> Result<Vec<PathBuf>, SelectError> {
    let unreadable = |source| SelectError::DirectoryUnreadable {
        path: root_dir.to_path_buf(),
        source,
    };

    let mut selected = Vec::new();

    for entry in fs::read_dir(root_dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let path = entry.path();

        // Follows symlinks; directories and special files are skipped
        if !path.is_file() {
            debug!("Skipping non-file entry: {}", path.display());
            continue;
        }

        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();

        if filter.accepts(&file_name)? {
            selected.push(path);
        } else {
            debug!("Skipping {}", file_name);
        }
    }

    selected.sort();

    debug!(
        "Selected {} file(s) from {} for job {}/{}",
        selected.len(),
        root_dir.display(),
        filter.assignment.job_index() + 1,
        filter.assignment.num_jobs()
    );

    Ok(selected)
}
