//! IQR-based outlier trimming

use super::schema::{NumericField, Record};

/// Whisker multiplier for the interquartile-range rule
pub const IQR_MULTIPLIER: f64 = 1.5;

/// Percentile of already-sorted values using linear interpolation between
/// closest ranks (`p` in `[0, 1]`). Returns `None` for an empty slice.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Sort a copy of `values`, dropping NaNs
pub fn sorted_finite(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Inclusive bounds derived from the 1.5 x IQR rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Bounds for the given values; `None` when there are no values
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let sorted = sorted_finite(values);
        let q1 = percentile_sorted(&sorted, 0.25)?;
        let q3 = percentile_sorted(&sorted, 0.75)?;
        let iqr = q3 - q1;
        Some(Self {
            q1,
            q3,
            lower: q1 - IQR_MULTIPLIER * iqr,
            upper: q3 + IQR_MULTIPLIER * iqr,
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Drop records outside the IQR bounds of each column, one column at a time.
///
/// Bounds for a column are computed from the records that survived the
/// previous columns, so a record must pass every listed column to survive.
/// Records with a missing value in a trimmed column are dropped.
pub fn trim_outliers<'a>(records: &[&'a Record], columns: &[NumericField]) -> Vec<&'a Record> {
    let mut surviving: Vec<&'a Record> = records.to_vec();

    for &column in columns {
        let Some(bounds) = IqrBounds::from_values(surviving.iter().filter_map(|r| r.value(column)))
        else {
            return Vec::new();
        };

        surviving.retain(|r| r.value(column).is_some_and(|v| bounds.contains(v)));
    }

    surviving
}
