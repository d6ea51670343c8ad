//! Command-line argument definitions using clap

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::pipeline::{CategoricalField, Chart, FilterParams, NumericField};

/// ScoreLens - Derive student performance dashboard tables from a CSV dataset
#[derive(Parser, Debug)]
#[command(name = "scorelens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input dataset (delimited .csv file)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Keep only the listed levels of a categorical field, e.g. Gender=Male,Female.
    /// Repeatable; a later flag for the same field replaces the earlier one.
    #[arg(long = "filter", value_name = "FIELD=LEVELS", value_parser = parse_category_filter)]
    pub filters: Vec<CategoryFilter>,

    /// Keep only records whose numeric field lies in [lo, hi], e.g. Exam_Score=60:100.
    /// Repeatable.
    #[arg(long = "range", value_name = "FIELD=LO:HI", value_parser = parse_range_filter)]
    pub ranges: Vec<RangeFilter>,

    /// JSON file with filter parameters. Flags given on the command line are applied on top.
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// JSON dashboard configuration (bins, stages, axes).
    /// Defaults to <config dir>/scorelens/config.json when that file exists.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Trim records outside 1.5 x IQR on the outlier columns, after filtering
    #[arg(long, default_value = "false")]
    pub remove_outliers: bool,

    /// Columns trimmed in order when --remove-outliers is set (comma-separated)
    #[arg(long, value_delimiter = ',', value_parser = parse_numeric_field)]
    pub outlier_columns: Vec<NumericField>,

    /// Dimension used for color/grouping (a categorical field, Score_Level,
    /// Study_Hours_Group or Tutoring_Group)
    #[arg(long)]
    pub color_by: Option<String>,

    /// Print only this chart table
    #[arg(long, value_parser = parse_chart)]
    pub chart: Option<Chart>,

    /// Write every chart table to this JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write one CSV per flat chart table into this directory
    #[arg(long)]
    pub csv_dir: Option<PathBuf>,

    /// Package the JSON and CSV exports into this zip archive
    #[arg(long)]
    pub bundle: Option<PathBuf>,

    /// Pick categorical filters interactively before computing
    #[arg(long, default_value = "false")]
    pub interactive: bool,

    /// Skip interactive confirmation prompts
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Number of rows to use for schema inference.
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a per-column summary of the dataset (missing values, levels, ranges)
    Describe {
        /// Input dataset (delimited .csv file)
        input: PathBuf,

        /// Number of rows to use for schema inference.
        /// Use 0 for full table scan.
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },
}

/// `--filter` value: a categorical field and its selected levels
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFilter {
    pub field: CategoricalField,
    pub levels: Vec<String>,
}

/// `--range` value: a numeric field and its inclusive bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeFilter {
    pub field: NumericField,
    pub lo: f64,
    pub hi: f64,
}

impl Cli {
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }

    /// Filter parameters given directly as flags
    pub fn flag_params(&self) -> FilterParams {
        let mut params = FilterParams::new();
        for filter in &self.filters {
            params = params.select(filter.field, filter.levels.iter().cloned());
        }
        for range in &self.ranges {
            params = params.range(range.field, range.lo, range.hi);
        }
        params.remove_outliers = self.remove_outliers;
        if let Some(columns) = self.outlier_override() {
            params.outlier_columns = columns;
        }
        params.color_by = self.color_by.clone();
        params
    }

    /// Filter parameters from `--params` (if any) with the flags layered on top
    pub fn filter_params(&self) -> Result<FilterParams> {
        let base = match &self.params {
            Some(path) => load_params_file(path)?,
            None => FilterParams::new(),
        };
        let mut params = base.merge(self.flag_params());
        if let Some(columns) = self.outlier_override() {
            params.outlier_columns = columns;
        }
        Ok(params)
    }

    /// Columns given with --outlier-columns, if the flag was used
    pub fn outlier_override(&self) -> Option<Vec<NumericField>> {
        (!self.outlier_columns.is_empty()).then(|| self.outlier_columns.clone())
    }

    /// Whether any file export was requested
    pub fn has_exports(&self) -> bool {
        self.output.is_some() || self.csv_dir.is_some() || self.bundle.is_some()
    }
}

fn load_params_file(path: &Path) -> Result<FilterParams> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read params file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse params file: {}", path.display()))
}

fn split_assignment<'a>(s: &'a str, example: &str) -> Result<(&'a str, &'a str), String> {
    s.split_once('=')
        .map(|(name, rest)| (name.trim(), rest.trim()))
        .ok_or_else(|| format!("expected {}, got '{}'", example, s))
}

/// Validator for --filter values
fn parse_category_filter(s: &str) -> Result<CategoryFilter, String> {
    let (name, rest) = split_assignment(s, "FIELD=LEVEL[,LEVEL...]")?;
    let field: CategoricalField = name.parse().map_err(|e| format!("{}", e))?;
    let levels: Vec<String> = rest
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    if let Some(bad) = levels.iter().find(|l| field.code_of(l).is_none()) {
        return Err(format!(
            "'{}' is not a level of {}. Expected one of: {}",
            bad,
            field,
            field.levels().join(", ")
        ));
    }
    Ok(CategoryFilter { field, levels })
}

/// Validator for --range values
fn parse_range_filter(s: &str) -> Result<RangeFilter, String> {
    let (name, rest) = split_assignment(s, "FIELD=LO:HI")?;
    let field = parse_numeric_field(name)?;
    let (lo, hi) = rest
        .split_once(':')
        .ok_or_else(|| format!("expected LO:HI, got '{}'", rest))?;
    let lo: f64 = lo
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", lo))?;
    let hi: f64 = hi
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", hi))?;

    if !lo.is_finite() || !hi.is_finite() {
        return Err(format!("range bounds must be finite, got {}:{}", lo, hi));
    }
    if lo > hi {
        return Err(format!(
            "lower bound {} is greater than upper bound {}",
            lo, hi
        ));
    }
    Ok(RangeFilter { field, lo, hi })
}

fn parse_numeric_field(s: &str) -> Result<NumericField, String> {
    s.trim().parse().map_err(|e| format!("{}", e))
}

fn parse_chart(s: &str) -> Result<Chart, String> {
    s.parse()
}
