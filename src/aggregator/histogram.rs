//! Pass 2: fixed-width binning and per-component counting.
//!
//! A residual `r` lands in bin `round(r / w) * w`, where `w` is the bin
//! width derived once from the pass 1 range. Counts are keyed by
//! `(component, bin)`.

use super::range::ValueRange;
use crate::parser::{read_records, Record};
use crate::utils::error::{BinningError, ParseError};
use log::debug;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Bin width derived after pass 1
///
/// **Public** - immutable for the whole of pass 2
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinWidth(f64);

impl BinWidth {
    /// Derive the width from an observed range
    ///
    /// **Public** - `(max - min) / num_bins`
    ///
    /// `num_bins` is a real divisor; fractional and negative values are
    /// accepted as-is.
    ///
    /// # Errors
    /// * `BinningError::ZeroBins` / `NonFiniteBins` - unusable divisor
    /// * `BinningError::EmptyRange` - no records were observed
    /// * `BinningError::ZeroWidth` - every residual has the same value
    /// * `BinningError::InvalidWidth` - the division is not finite
    pub fn derive(range: &ValueRange, num_bins: f64) -> Result<Self, BinningError> {
        check_num_bins(num_bins)?;

        if range.is_empty() {
            return Err(BinningError::EmptyRange);
        }

        if range.span() == 0.0 {
            return Err(BinningError::ZeroWidth(range.min));
        }

        Self::checked(range.span() / num_bins)
    }

    /// Derive the width from explicit bounds instead of an observed range
    ///
    /// **Public** - lets independent shard jobs share one bin width
    ///
    /// # Errors
    /// * `BinningError::InvalidRange` - bounds are not finite or `min >= max`
    /// * the divisor and width errors of `derive`
    pub fn from_bounds(min: f64, max: f64, num_bins: f64) -> Result<Self, BinningError> {
        check_num_bins(num_bins)?;

        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(BinningError::InvalidRange { min, max });
        }

        Self::checked((max - min) / num_bins)
    }

    fn checked(width: f64) -> Result<Self, BinningError> {
        if !width.is_finite() || width == 0.0 {
            return Err(BinningError::InvalidWidth(width));
        }
        Ok(Self(width))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Bin a residual
    ///
    /// **Public** - rounds half away from zero
    pub fn bin_for(&self, residual: f64) -> BinKey {
        BinKey::new((residual / self.0).round() * self.0)
    }
}

fn check_num_bins(num_bins: f64) -> Result<(), BinningError> {
    if !num_bins.is_finite() {
        return Err(BinningError::NonFiniteBins(num_bins));
    }
    if num_bins == 0.0 {
        return Err(BinningError::ZeroBins);
    }
    Ok(())
}

/// Bin value usable as an ordered map key
///
/// `-0.0` is folded into `0.0`; ordering follows `f64::total_cmp`.
#[derive(Debug, Clone, Copy)]
pub struct BinKey(f64);

impl BinKey {
    pub fn new(value: f64) -> Self {
        if value == 0.0 {
            Self(0.0)
        } else {
            Self(value)
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl PartialEq for BinKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BinKey {}

impl PartialOrd for BinKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BinKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Per-component histogram table
///
/// **Public** - built in pass 2, read once for output
///
/// Components are raw label bytes and iterate in byte order, bins ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    table: BTreeMap<Vec<u8>, BTreeMap<BinKey, u64>>,
}

/// One emitted histogram entry
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramEntry<'a> {
    pub component: &'a [u8],
    pub bin: f64,
    pub count: u64,
}

impl HistogramEntry<'_> {
    /// Component label for display (invalid UTF-8 replaced)
    pub fn label(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.component)
    }
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one residual under `component`
    pub fn increment(&mut self, component: impl AsRef<[u8]>, bin: BinKey) {
        let bins = self.table.entry(component.as_ref().to_vec()).or_default();
        *bins.entry(bin).or_insert(0) += 1;
    }

    /// Bin and count a batch of records
    pub fn add_records<'a>(&mut self, width: BinWidth, records: impl IntoIterator<Item = &'a Record>) {
        for record in records {
            self.increment(&record.component, width.bin_for(record.residual));
        }
    }

    /// Count recorded for one `(component, bin)` pair
    pub fn count(&self, component: impl AsRef<[u8]>, bin: f64) -> u64 {
        self.table
            .get(component.as_ref())
            .and_then(|bins| bins.get(&BinKey::new(bin)))
            .copied()
            .unwrap_or(0)
    }

    pub fn components(&self) -> impl Iterator<Item = &[u8]> {
        self.table.keys().map(Vec::as_slice)
    }

    /// Bins of one component with their counts, ascending
    pub fn bins(&self, component: impl AsRef<[u8]>) -> Vec<(f64, u64)> {
        self.table
            .get(component.as_ref())
            .map(|bins| bins.iter().map(|(bin, count)| (bin.value(), *count)).collect())
            .unwrap_or_default()
    }

    /// Sum of all counts under one component
    pub fn component_total(&self, component: impl AsRef<[u8]>) -> u64 {
        self.table
            .get(component.as_ref())
            .map(|bins| bins.values().sum())
            .unwrap_or(0)
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.table.values().flat_map(|bins| bins.values()).sum()
    }

    /// Number of distinct `(component, bin)` entries
    pub fn len(&self) -> usize {
        self.table.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// All entries, grouped by component
    pub fn entries(&self) -> impl Iterator<Item = HistogramEntry<'_>> {
        self.table.iter().flat_map(|(component, bins)| {
            bins.iter().map(move |(bin, count)| HistogramEntry {
                component: component.as_slice(),
                bin: bin.value(),
                count: *count,
            })
        })
    }
}

/// Re-read every selected file and bin its records
///
/// **Public** - pass 2 entry point
///
/// # Arguments
/// * `files` - Selected input files (same selection as pass 1)
/// * `width` - Bin width derived from pass 1
///
/// # Errors
/// Any read or record format error aborts the pass
pub fn bin_records(files: &[PathBuf], width: BinWidth) -> Result<Histogram, ParseError> {
    let mut histogram = Histogram::new();

    for path in files {
        let records = read_records(path)?;
        histogram.add_records(width, &records);
    }

    debug!(
        "Binned {} records into {} entries across {} components",
        histogram.total(),
        histogram.len(),
        histogram.table.len()
    );

    Ok(histogram)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_of(values: &[f64]) -> ValueRange {
        let mut range = ValueRange::default();
        for &value in values {
            range.observe(value);
        }
        range
    }

    #[test]
    fn test_derive_width() {
        let width = BinWidth::derive(&range_of(&[1.0, 3.0]), 2.0).unwrap();
        assert_eq!(width.value(), 1.0);
    }

    #[test]
    fn test_derive_width_fractional_bins() {
        let width = BinWidth::derive(&range_of(&[0.0, 3.0]), 1.5).unwrap();
        assert_eq!(width.value(), 2.0);
    }

    #[test]
    fn test_derive_width_zero_bins() {
        let result = BinWidth::derive(&range_of(&[1.0, 3.0]), 0.0);
        assert_eq!(result, Err(BinningError::ZeroBins));
    }

    #[test]
    fn test_derive_width_non_finite_bins() {
        let result = BinWidth::derive(&range_of(&[1.0, 3.0]), f64::NAN);
        assert!(matches!(result, Err(BinningError::NonFiniteBins(_))));
    }

    #[test]
    fn test_derive_width_empty_range() {
        let result = BinWidth::derive(&ValueRange::default(), 10.0);
        assert_eq!(result, Err(BinningError::EmptyRange));
    }

    #[test]
    fn test_derive_width_single_value() {
        let result = BinWidth::derive(&range_of(&[4.0, 4.0]), 10.0);
        assert_eq!(result, Err(BinningError::ZeroWidth(4.0)));
    }

    #[test]
    fn test_from_bounds() {
        let width = BinWidth::from_bounds(-1.0, 1.0, 4.0).unwrap();
        assert_eq!(width.value(), 0.5);

        assert!(matches!(
            BinWidth::from_bounds(1.0, 1.0, 4.0),
            Err(BinningError::InvalidRange { .. })
        ));
        assert!(matches!(
            BinWidth::from_bounds(2.0, 1.0, 4.0),
            Err(BinningError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_bin_for_rounds_to_nearest_multiple() {
        let width = BinWidth::from_bounds(0.0, 1.0, 2.0).unwrap();
        assert_eq!(width.bin_for(0.2).value(), 0.0);
        assert_eq!(width.bin_for(0.3).value(), 0.5);
        assert_eq!(width.bin_for(0.74).value(), 0.5);
        assert_eq!(width.bin_for(-0.8).value(), -1.0);
    }

    #[test]
    fn test_bin_for_half_rounds_away_from_zero() {
        let width = BinWidth::from_bounds(0.0, 2.0, 2.0).unwrap();
        assert_eq!(width.bin_for(0.5).value(), 1.0);
        assert_eq!(width.bin_for(-0.5).value(), -1.0);
    }

    #[test]
    fn test_bin_for_negative_width() {
        let width = BinWidth::derive(&range_of(&[0.0, 2.0]), -2.0).unwrap();
        assert_eq!(width.value(), -1.0);
        assert_eq!(width.bin_for(1.2).value(), 1.0);
    }

    #[test]
    fn test_negative_zero_shares_bin_with_zero() {
        let width = BinWidth::from_bounds(0.0, 1.0, 1.0).unwrap();
        let mut histogram = Histogram::new();
        histogram.increment("A", width.bin_for(-0.2));
        histogram.increment("A", width.bin_for(0.2));

        assert_eq!(histogram.len(), 1);
        assert_eq!(histogram.count("A", 0.0), 2);
    }

    #[test]
    fn test_histogram_counts() {
        let width = BinWidth::from_bounds(1.0, 3.0, 2.0).unwrap();
        let records = vec![
            Record::new(1.0, "A"),
            Record::new(1.1, "A"),
            Record::new(3.0, "A"),
            Record::new(2.0, "B"),
        ];

        let mut histogram = Histogram::new();
        histogram.add_records(width, &records);

        assert_eq!(histogram.count("A", 1.0), 2);
        assert_eq!(histogram.count("A", 3.0), 1);
        assert_eq!(histogram.count("B", 2.0), 1);
        assert_eq!(histogram.count("B", 1.0), 0);
        assert_eq!(histogram.component_total("A"), 3);
        assert_eq!(histogram.total(), 4);
        assert_eq!(histogram.len(), 3);
    }

    #[test]
    fn test_entries_are_ordered() {
        let mut histogram = Histogram::new();
        histogram.increment("b", BinKey::new(2.0));
        histogram.increment("a", BinKey::new(5.0));
        histogram.increment("a", BinKey::new(-1.0));

        let entries: Vec<(String, f64, u64)> = histogram
            .entries()
            .map(|e| (e.label().into_owned(), e.bin, e.count))
            .collect();

        assert_eq!(
            entries,
            vec![
                ("a".to_string(), -1.0, 1),
                ("a".to_string(), 5.0, 1),
                ("b".to_string(), 2.0, 1),
            ]
        );
        assert_eq!(
            histogram.components().collect::<Vec<_>>(),
            vec![&b"a"[..], &b"b"[..]]
        );
        assert_eq!(histogram.bins("a"), vec![(-1.0, 1), (5.0, 1)]);
    }
}
