//! Tab-separated histogram output.
//!
//! One line per `(component, bin)`: `component\tbin\tcount`.
//! No header, no trailing summary.

use crate::aggregator::{Histogram, HistogramEntry};
use crate::utils::config::{BIN_VALUE_SIGNIFICANT_DIGITS, OUTPUT_FIELD_SEPARATOR};
use crate::utils::error::OutputError;
use log::debug;
use std::io::Write;

/// Render a bin value the way downstream tooling expects
///
/// **Public** - `%.12g` style with a trailing `.0` on integral values
///
/// # Example
/// ```ignore
/// assert_eq!(format_bin_value(1.0), "1.0");
/// assert_eq!(format_bin_value(0.1 + 0.2), "0.3");
/// assert_eq!(format_bin_value(1e16), "1e+16");
/// ```
pub fn format_bin_value(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let digits = BIN_VALUE_SIGNIFICANT_DIGITS as i32;

    // Scientific rendering tells us the decimal exponent after rounding
    let scientific = format!("{:.*e}", BIN_VALUE_SIGNIFICANT_DIGITS - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    if exponent < -4 || exponent >= digits {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs());
    }

    let precision = (digits - 1 - exponent) as usize;
    let fixed = format!("{:.*}", precision, value);
    let mut fixed = trim_fraction(&fixed).to_string();
    if !fixed.contains('.') {
        fixed.push_str(".0");
    }
    fixed
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Format one histogram entry as an output line (without newline)
///
/// **Public** - the label bytes are copied through untouched
pub fn format_entry(entry: &HistogramEntry<'_>) -> Vec<u8> {
    let mut line = entry.component.to_vec();
    line.extend_from_slice(OUTPUT_FIELD_SEPARATOR.as_bytes());
    line.extend_from_slice(format_bin_value(entry.bin).as_bytes());
    line.extend_from_slice(OUTPUT_FIELD_SEPARATOR.as_bytes());
    line.extend_from_slice(entry.count.to_string().as_bytes());
    line
}

/// Write every histogram entry to `writer`
///
/// **Public** - main entry point for histogram output
///
/// # Returns
/// Number of lines written
///
/// # Errors
/// * `OutputError::WriteFailed` - the writer failed (e.g. closed pipe)
pub fn write_histogram<W: Write>(histogram: &Histogram, mut writer: W) -> Result<usize, OutputError> {
    let mut lines = 0;

    for entry in histogram.entries() {
        writer.write_all(&format_entry(&entry))?;
        writer.write_all(b"\n")?;
        lines += 1;
    }

    writer.flush()?;
    debug!("Wrote {} histogram lines", lines);

    Ok(lines)
}
