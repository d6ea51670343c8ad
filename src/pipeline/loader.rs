//! Dataset loader: reads the CSV once and converts it to typed records

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;

use super::error::DatasetError;
use super::schema::{CategoricalField, Dataset, NumericField, Record};

/// Load and validate the dataset at `path`.
///
/// Any failure (missing file, missing column, non-numeric measure, unknown
/// category label) is fatal: no partial dataset is returned.
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<Dataset> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if extension != "csv" {
        anyhow::bail!(
            "Unsupported file format: '{}'. Only delimited .csv files are supported",
            extension
        );
    }
    if !path.is_file() {
        anyhow::bail!("Dataset file not found: {}", path.display());
    }

    // 0 means full table scan
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(schema_length)
        .finish()
        .with_context(|| format!("Failed to load CSV file: {}", path.display()))?
        .collect()
        .with_context(|| format!("Failed to read CSV file: {}", path.display()))?;

    let dataset = dataset_from_frame(&df)
        .with_context(|| format!("Schema mismatch in {}", path.display()))?;

    Ok(dataset)
}

fn require<'a>(
    df: &'a DataFrame,
    name: &str,
    available: &[String],
) -> Result<&'a Column, DatasetError> {
    df.column(name).map_err(|_| DatasetError::MissingColumn {
        column: name.to_string(),
        available: available.to_vec(),
    })
}

/// Convert a DataFrame with the required columns into a [`Dataset`].
/// Extra columns are ignored.
pub fn dataset_from_frame(df: &DataFrame) -> Result<Dataset, DatasetError> {
    let available: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    // Check the whole header first so the error names the first missing column
    for name in CategoricalField::ALL
        .iter()
        .map(|f| f.column_name())
        .chain(NumericField::ALL.iter().map(|f| f.column_name()))
    {
        require(df, name, &available)?;
    }

    let mut records = vec![Record::default(); df.height()];

    for field in CategoricalField::ALL {
        let column = require(df, field.column_name(), &available)?;
        let as_text = column.cast(&DataType::String)?;
        for (row, value) in as_text.str()?.into_iter().enumerate() {
            let Some(label) = value.map(str::trim).filter(|s| !s.is_empty()) else {
                continue;
            };
            records[row]
                .set_level(field, label)
                .map_err(|_| DatasetError::UnknownLevel {
                    column: field.column_name().to_string(),
                    value: label.to_string(),
                    row,
                    expected: field.levels().to_vec(),
                })?;
        }
    }

    for field in NumericField::ALL {
        let column = require(df, field.column_name(), &available)?;
        let dtype = column.dtype();
        if !(dtype.is_primitive_numeric() || matches!(dtype, DataType::Null)) {
            return Err(DatasetError::NotNumeric {
                column: field.column_name().to_string(),
                dtype: dtype.to_string(),
            });
        }
        let as_float = column.cast(&DataType::Float64)?;
        for (row, value) in as_float.f64()?.into_iter().enumerate() {
            records[row].set_value(field, value);
        }
    }

    Ok(Dataset::new(records))
}
