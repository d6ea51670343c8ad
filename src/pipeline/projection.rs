//! Row projections for scatter and parallel-coordinates charts

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::schema::{CategoricalField, Dimension, NumericField, Record};

/// A numeric axis: a numeric column, or a categorical field read as its ordinal code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Axis {
    Numeric(NumericField),
    Ordinal(CategoricalField),
}

impl Axis {
    pub fn name(self) -> &'static str {
        match self {
            Axis::Numeric(field) => field.column_name(),
            Axis::Ordinal(field) => field.column_name(),
        }
    }

    pub fn value(self, record: &Record) -> Option<f64> {
        match self {
            Axis::Numeric(field) => record.value(field),
            Axis::Ordinal(field) => record.code(field).map(f64::from),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Axis {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<NumericField>()
            .map(Axis::Numeric)
            .or_else(|_| s.parse::<CategoricalField>().map(Axis::Ordinal))
    }
}

impl TryFrom<String> for Axis {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Axis> for String {
    fn from(axis: Axis) -> Self {
        axis.name().to_string()
    }
}

/// Projected rows: one value per axis, plus an optional color label
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Projection {
    pub axes: Vec<String>,
    pub color_dimension: Option<String>,
    pub rows: Vec<Vec<f64>>,
    /// Color label per row, parallel to `rows` when a color dimension is set
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
}

impl Projection {
    /// Mean of one axis over the projected rows; NaN when there are none
    pub fn axis_mean(&self, axis: usize) -> f64 {
        if self.rows.is_empty() {
            return f64::NAN;
        }
        self.rows.iter().map(|row| row[axis]).sum::<f64>() / self.rows.len() as f64
    }
}

/// Project the subset onto `axes`, skipping records missing any axis value
/// (or the color label, when `color` is given).
pub fn project(records: &[&Record], axes: &[Axis], color: Option<&Dimension>) -> Projection {
    let mut projection = Projection {
        axes: axes.iter().map(|a| a.name().to_string()).collect(),
        color_dimension: color.map(|d| d.name().to_string()),
        ..Default::default()
    };

    for record in records {
        let Some(row) = axes
            .iter()
            .map(|a| a.value(record))
            .collect::<Option<Vec<f64>>>()
        else {
            continue;
        };

        if let Some(dim) = color {
            let Some(label) = dim.label(record) else {
                continue;
            };
            projection.colors.push(label.to_string());
        }
        projection.rows.push(row);
    }

    projection
}
