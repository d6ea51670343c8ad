//! Error types for dataset loading and derived-table construction.
//!
//! `DatasetError` covers the one-time load (always fatal to a session),
//! `PipelineError` covers invalid parameters rejected before any computation.
//! Empty results are never errors.

use thiserror::Error;

/// Errors raised while turning a raw CSV file into a typed dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A required column is absent from the file header.
    #[error("Required column '{column}' not found. Available columns: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// A numeric column was inferred with a non-numeric dtype.
    #[error("Column '{column}' must be numeric, found {dtype}")]
    NotNumeric { column: String, dtype: String },

    /// A categorical cell holds a label outside the field's declared levels.
    #[error("Unknown value '{value}' in column '{column}' (row {row}). Expected one of: {expected:?}")]
    UnknownLevel {
        column: String,
        value: String,
        row: usize,
        expected: Vec<&'static str>,
    },

    /// Underlying polars failure while reading or casting.
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),
}

/// Precondition failures for pipeline operations.
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("Invalid range for '{field}': lower bound {lo} is greater than upper bound {hi}")]
    InvalidRange { field: String, lo: f64, hi: f64 },

    #[error("Range bounds for '{field}' must be finite, got [{lo}, {hi}]")]
    NonFiniteRange { field: String, lo: f64, hi: f64 },

    #[error("Unknown category '{value}' for '{field}'. Expected one of: {expected:?}")]
    UnknownCategory {
        field: String,
        value: String,
        expected: Vec<&'static str>,
    },

    #[error("Invalid binning: {0}")]
    InvalidBinning(String),

    #[error("Correlation needs at least 2 columns, got {0}")]
    TooFewColumns(usize),

    #[error("Flow table needs at least 2 stages, got {0}")]
    TooFewStages(usize),

    #[error("Unknown column or dimension '{0}'")]
    UnknownDimension(String),

    #[error("Aggregation needs at least one group key")]
    NoGroupKeys,
}
