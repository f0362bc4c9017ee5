//! Input record parsing.
//!
//! Worker output files are plain text, one `<residual>\t<component>`
//! record per line.

pub mod record;

// Re-export main types
pub use record::{parse_line, read_records, Record};
