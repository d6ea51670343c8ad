//! Per-column profile of a loaded dataset: missing ratios and value summaries

use serde::Serialize;

use super::aggregate::{category_shares, CategoryShare};
use super::schema::{CategoricalField, Dataset, Dimension, NumericField, Record};

/// Summary of one numeric column over its non-missing values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericProfile {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnSummary {
    Categorical { levels: Vec<CategoryShare> },
    Numeric { profile: Option<NumericProfile> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub column: String,
    pub missing: usize,
    pub missing_ratio: f64,
    pub summary: ColumnSummary,
}

fn missing_ratio(missing: usize, rows: usize) -> f64 {
    if rows == 0 {
        0.0
    } else {
        missing as f64 / rows as f64
    }
}

fn numeric_profile(records: &[&Record], field: NumericField) -> Option<NumericProfile> {
    let values: Vec<f64> = records.iter().filter_map(|r| r.value(field)).collect();
    if values.is_empty() {
        return None;
    }
    Some(NumericProfile {
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        mean: values.iter().sum::<f64>() / values.len() as f64,
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

/// Profile every schema column, sorted by missing ratio descending
pub fn describe_dataset(dataset: &Dataset) -> Vec<ColumnProfile> {
    let records = dataset.all();
    let rows = records.len();
    let mut profiles = Vec::with_capacity(CategoricalField::COUNT + NumericField::COUNT);

    for field in CategoricalField::ALL {
        let missing = records.iter().filter(|r| r.code(field).is_none()).count();
        profiles.push(ColumnProfile {
            column: field.column_name().to_string(),
            missing,
            missing_ratio: missing_ratio(missing, rows),
            summary: ColumnSummary::Categorical {
                levels: category_shares(&records, &Dimension::Category(field)),
            },
        });
    }

    for field in NumericField::ALL {
        let missing = records.iter().filter(|r| r.value(field).is_none()).count();
        profiles.push(ColumnProfile {
            column: field.column_name().to_string(),
            missing,
            missing_ratio: missing_ratio(missing, rows),
            summary: ColumnSummary::Numeric {
                profile: numeric_profile(&records, field),
            },
        });
    }

    // Stable sort keeps schema order among equal ratios
    profiles.sort_by(|a, b| b.missing_ratio.total_cmp(&a.missing_ratio));
    profiles
}
