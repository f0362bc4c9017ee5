//! Residual record parser.
//!
//! Each input line holds `<residual>\t<component>`.
//! Lines are trimmed first; blank lines carry no record.
//! Component labels are opaque bytes; only the residual must be text.

use crate::utils::config::RECORD_FIELD_SEPARATOR;
use crate::utils::error::ParseError;
use log::debug;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One residual observation
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Residual value
    pub residual: f64,

    /// Component label, kept byte for byte
    pub component: Vec<u8>,
}

impl Record {
    pub fn new(residual: f64, component: impl Into<Vec<u8>>) -> Self {
        Self {
            residual,
            component: component.into(),
        }
    }

    /// Label for display (invalid UTF-8 replaced)
    pub fn label(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.component)
    }
}

/// Parse a single input line
///
/// **Public** - used by `read_records` and tests
///
/// # Arguments
/// * `line` - Raw line bytes (newline optional)
/// * `path` - File the line came from (for diagnostics)
/// * `line_number` - 1-based line number (for diagnostics)
///
/// # Returns
/// `Ok(None)` for blank lines, `Ok(Some(record))` otherwise
///
/// # Errors
/// * `ParseError::FieldCount` - not exactly two tab-separated fields
/// * `ParseError::InvalidResidual` - residual is not a number
/// * `ParseError::NonFiniteResidual` - residual is NaN or infinite
pub fn parse_line(line: &[u8], path: &Path, line_number: usize) -> Result<Option<Record>, ParseError> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return Ok(None);
    }

    let fields: Vec<&[u8]> = line.split(|&b| b == RECORD_FIELD_SEPARATOR).collect();
    let &[residual_field, component] = fields.as_slice() else {
        return Err(ParseError::FieldCount {
            path: path.to_path_buf(),
            line: line_number,
            found: fields.len(),
        });
    };

    let residual_text = String::from_utf8_lossy(residual_field.trim_ascii());
    let residual: f64 = std::str::from_utf8(residual_field.trim_ascii())
        .ok()
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| ParseError::InvalidResidual {
            path: path.to_path_buf(),
            line: line_number,
            value: residual_text.to_string(),
        })?;

    if !residual.is_finite() {
        return Err(ParseError::NonFiniteResidual {
            path: path.to_path_buf(),
            line: line_number,
            value: residual_text.to_string(),
        });
    }

    Ok(Some(Record::new(residual, component)))
}

/// Read every record from a file
///
/// **Public** - each merge pass calls this once per selected file
///
/// Lines are read as raw bytes. The file handle is dropped before
/// returning.
///
/// # Errors
/// * `ParseError::Io` - file cannot be opened or read
/// * any error from `parse_line`
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<Record>, ParseError> {
    let path = path.as_ref();
    let io_error = |source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = BufReader::new(File::open(path).map_err(io_error)?);
    let mut records = Vec::new();
    let mut line = Vec::new();
    let mut line_number = 0;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).map_err(io_error)? == 0 {
            break;
        }
        line_number += 1;

        if let Some(record) = parse_line(&line, path, line_number)? {
            records.push(record);
        }
    }

    debug!("Read {} records from {}", records.len(), path.display());

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(line: &str) -> Result<Option<Record>, ParseError> {
        parse_line(line.as_bytes(), Path::new("test.out"), 1)
    }

    #[test]
    fn test_parse_line() {
        let record = parse("1.5\tC13").unwrap().unwrap();
        assert_eq!(record, Record::new(1.5, "C13"));
    }

    #[test]
    fn test_parse_line_trims_surrounding_whitespace() {
        let record = parse("  -0.25\tH \r").unwrap().unwrap();
        assert_eq!(record, Record::new(-0.25, "H"));
    }

    #[test]
    fn test_parse_line_blank() {
        assert!(parse("").unwrap().is_none());
        assert!(parse("   \t  ").unwrap().is_none());
    }

    #[test]
    fn test_parse_line_scientific_notation() {
        let record = parse("2.5e-3\tN").unwrap().unwrap();
        assert_eq!(record.residual, 0.0025);
    }

    #[test]
    fn test_parse_line_wrong_field_count() {
        assert!(matches!(
            parse("1.0"),
            Err(ParseError::FieldCount { found: 1, .. })
        ));
        assert!(matches!(
            parse("1.0\tA\tB"),
            Err(ParseError::FieldCount { found: 3, .. })
        ));
    }

    #[test]
    fn test_parse_line_bad_residual() {
        assert!(matches!(
            parse("abc\tA"),
            Err(ParseError::InvalidResidual { .. })
        ));
    }

    #[test]
    fn test_parse_line_non_finite_residual() {
        assert!(matches!(
            parse("nan\tA"),
            Err(ParseError::NonFiniteResidual { .. })
        ));
        assert!(matches!(
            parse("-inf\tA"),
            Err(ParseError::NonFiniteResidual { .. })
        ));
    }

    #[test]
    fn test_read_records() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1.0\tA").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "3.0\tB").unwrap();

        let records = read_records(file.path()).unwrap();
        assert_eq!(records, vec![Record::new(1.0, "A"), Record::new(3.0, "B")]);
    }

    #[test]
    fn test_read_records_reports_line_number() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1.0\tA").unwrap();
        writeln!(file, "oops").unwrap();

        let err = read_records(file.path()).unwrap_err();
        assert!(matches!(err, ParseError::FieldCount { line: 2, .. }));
        assert!(err.to_string().contains(":2:"));
    }

    #[test]
    fn test_parse_line_latin1_label_kept_verbatim() {
        let record = parse_line(b"1.0\tC\xe913\n", Path::new("test.out"), 1)
            .unwrap()
            .unwrap();

        assert_eq!(record.component, b"C\xe913".to_vec());
        assert_eq!(record.label(), "C\u{fffd}13");
    }

    #[test]
    fn test_parse_line_non_utf8_residual() {
        let err = parse_line(b"1.\xff\tA", Path::new("test.out"), 4).unwrap_err();
        assert!(matches!(err, ParseError::InvalidResidual { line: 4, .. }));
    }

    #[test]
    fn test_read_records_latin1_labels() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"1.0\tC\xe913\n3.0\tA\n2.0\tC\xe813\n").unwrap();

        let records = read_records(file.path()).unwrap();

        assert_eq!(
            records,
            vec![
                Record::new(1.0, b"C\xe913".to_vec()),
                Record::new(3.0, "A"),
                Record::new(2.0, b"C\xe813".to_vec()),
            ]
        );
    }

    #[test]
    fn test_read_records_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_records(dir.path().join("missing.out"));
        assert!(matches!(result, Err(ParseError::Io { .. })));
    }
}
