//! Pairwise Pearson correlation matrix over numeric columns

use faer::Mat;
use rayon::prelude::*;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::error::PipelineError;
use super::schema::{NumericField, Record};

/// Symmetric correlation matrix; undefined cells hold NaN
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<NumericField>,
    pub values: Mat<f64>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[(i, j)]
    }

    /// Look up a cell by column; `None` if either column is not in the matrix
    pub fn between(&self, a: NumericField, b: NumericField) -> Option<f64> {
        let i = self.columns.iter().position(|&c| c == a)?;
        let j = self.columns.iter().position(|&c| c == b)?;
        Some(self.get(i, j))
    }

    /// Row-major copy of the matrix with NaN mapped to `None`
    pub fn to_rows(&self) -> Vec<Vec<Option<f64>>> {
        (0..self.size())
            .map(|i| {
                (0..self.size())
                    .map(|j| Some(self.get(i, j)).filter(|v| !v.is_nan()))
                    .collect()
            })
            .collect()
    }
}

impl Serialize for CorrelationMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CorrelationMatrix", 2)?;
        state.serialize_field("columns", &self.columns)?;
        state.serialize_field("values", &self.to_rows())?;
        state.end()
    }
}

/// Pearson correlation of paired observations using Welford's single-pass
/// update. NaN when fewer than two pairs exist or either side is constant.
fn pearson(pairs: impl Iterator<Item = (f64, f64)>) -> f64 {
    let mut n = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    for (x, y) in pairs {
        n += 1.0;
        let dx = x - mean_x;
        let dy = y - mean_y;
        mean_x += dx / n;
        mean_y += dy / n;
        var_x += dx * (x - mean_x);
        var_y += dy * (y - mean_y);
        cov_xy += dx * (y - mean_y);
    }

    if n < 2.0 || var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }

    (cov_xy / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// Correlate every pair of `columns` over the subset.
///
/// Each cell uses the rows where both values are present. The diagonal is 1.0
/// unless the column is constant or has fewer than two values, in which case
/// it is NaN like every other cell touching that column.
pub fn correlate(
    records: &[&Record],
    columns: &[NumericField],
) -> Result<CorrelationMatrix, PipelineError> {
    if columns.len() < 2 {
        return Err(PipelineError::TooFewColumns(columns.len()));
    }

    // Extract each column once; the per-pair pass then only zips slices
    let extracted: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|&c| records.iter().map(|r| r.value(c)).collect())
        .collect();

    let n = columns.len();
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (i..n).map(move |j| (i, j)))
        .collect();

    let cells: Vec<(usize, usize, f64)> = pairs
        .par_iter()
        .map(|&(i, j)| {
            let paired = extracted[i]
                .iter()
                .zip(&extracted[j])
                .filter_map(|(x, y)| Some(((*x)?, (*y)?)));
            let r = pearson(paired);
            // A defined self-correlation is exactly 1
            let r = if i == j && !r.is_nan() { 1.0 } else { r };
            (i, j, r)
        })
        .collect();

    let mut values = Mat::<f64>::zeros(n, n);
    for (i, j, r) in cells {
        values[(i, j)] = r;
        values[(j, i)] = r;
    }

    Ok(CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    })
}
