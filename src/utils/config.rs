//! Configuration and constants for the CLI.

/// Current JSON report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Substring every worker output file name carries
pub const OUTPUT_FILE_MARKER: &str = ".out";

// Shard ids live between the last '_' and the following '.'
// e.g. "residuals_theo_17.out" -> 17
pub const SHARD_ID_DELIMITER: char = '_';
pub const SHARD_ID_TERMINATOR: char = '.';

/// Separator between residual and component label in input records
pub const RECORD_FIELD_SEPARATOR: u8 = b'\t';

/// Separator between fields of emitted histogram lines
pub const OUTPUT_FIELD_SEPARATOR: &str = "\t";

/// Significant digits used when rendering bin values (matches `%.12g`)
pub const BIN_VALUE_SIGNIFICANT_DIGITS: usize = 12;
