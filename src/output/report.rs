//! JSON run report.
//!
//! Written next to the histogram lines when `--report` is given, so a
//! downstream merge of several jobs can check which shards each job
//! covered and which bin width it used.

use super::schema::MergeReport;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Render a report as pretty-printed JSON (newline terminated)
pub fn render_report(report: &MergeReport) -> Result<String, OutputError> {
    let mut text = serde_json::to_string_pretty(report)?;
    text.push('\n');
    Ok(text)
}

/// Write a report to `path`, creating missing parent directories
///
/// **Public** - called by the merge command after the histogram is out
///
/// # Errors
/// * `OutputError::SerializationFailed` - report cannot be rendered
/// * `OutputError::ReportFailed` - directory creation or write failed
pub fn write_report(report: &MergeReport, path: impl AsRef<Path>) -> Result<(), OutputError> {
    let path = path.as_ref();
    let failed = |source| OutputError::ReportFailed {
        path: path.to_path_buf(),
        source,
    };

    let text = render_report(report)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(failed)?;
    }
    fs::write(path, &text).map_err(failed)?;

    debug!("Report: {} bytes, {} components", text.len(), report.components.len());
    info!("Report written to: {}", path.display());

    Ok(())
}
