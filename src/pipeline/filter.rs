//! Record filtering driven by user-selected parameters

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::schema::{CategoricalField, Dataset, NumericField, Record};

/// Inclusive numeric range `[lo, hi]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub lo: f64,
    pub hi: f64,
}

impl NumericRange {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lo <= value && value <= self.hi
    }

    fn validate(&self, field: NumericField) -> Result<(), PipelineError> {
        if !self.lo.is_finite() || !self.hi.is_finite() {
            return Err(PipelineError::NonFiniteRange {
                field: field.column_name().to_string(),
                lo: self.lo,
                hi: self.hi,
            });
        }
        if self.lo > self.hi {
            return Err(PipelineError::InvalidRange {
                field: field.column_name().to_string(),
                lo: self.lo,
                hi: self.hi,
            });
        }
        Ok(())
    }
}

fn default_outlier_columns() -> Vec<NumericField> {
    vec![NumericField::HoursStudied, NumericField::ExamScore]
}

/// Parameters collected from the user for one recomputation pass.
///
/// Every field is optional: an absent or empty selection means "no restriction".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Selected levels per categorical field
    pub categories: BTreeMap<CategoricalField, BTreeSet<String>>,
    /// Inclusive ranges per numeric field
    pub ranges: BTreeMap<NumericField, NumericRange>,
    /// Apply IQR trimming after filtering
    pub remove_outliers: bool,
    /// Columns trimmed, in order, when `remove_outliers` is set
    pub outlier_columns: Vec<NumericField>,
    /// Grouping/color dimension name (e.g. "Gender", "Score_Level")
    pub color_by: Option<String>,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            categories: BTreeMap::new(),
            ranges: BTreeMap::new(),
            remove_outliers: false,
            outlier_columns: default_outlier_columns(),
            color_by: None,
        }
    }
}

impl FilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict `field` to the given levels (replaces any earlier selection)
    pub fn select<I, S>(mut self, field: CategoricalField, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories
            .insert(field, levels.into_iter().map(Into::into).collect());
        self
    }

    pub fn range(mut self, field: NumericField, lo: f64, hi: f64) -> Self {
        self.ranges.insert(field, NumericRange::new(lo, hi));
        self
    }

    /// Layer `other` on top of `self`: selections and ranges from `other` win
    /// per field, flags are OR-ed, and a set `color_by` replaces ours.
    /// `outlier_columns` always has a value, so ours are kept; callers with an
    /// explicit column list set it afterwards.
    pub fn merge(mut self, other: FilterParams) -> Self {
        self.categories.extend(other.categories);
        self.ranges.extend(other.ranges);
        self.remove_outliers |= other.remove_outliers;
        if other.color_by.is_some() {
            self.color_by = other.color_by;
        }
        self
    }

    /// Check every selection against the declared levels and every range for sanity
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (field, selected) in &self.categories {
            if let Some(bad) = selected.iter().find(|label| field.code_of(label).is_none()) {
                return Err(PipelineError::UnknownCategory {
                    field: field.column_name().to_string(),
                    value: bad.clone(),
                    expected: field.levels().to_vec(),
                });
            }
        }
        for (field, range) in &self.ranges {
            range.validate(*field)?;
        }
        Ok(())
    }
}

/// Compiled form of the categorical selections: allowed codes per field
struct CodeSelection {
    field: CategoricalField,
    codes: Vec<u8>,
}

/// Keep the records that satisfy every constraint in `params`.
///
/// Categorical and range constraints compose with AND. A record whose
/// constrained cell is missing fails that constraint. Outlier trimming is not
/// applied here; see [`super::outliers::trim_outliers`].
pub fn filter_records<'a>(
    dataset: &'a Dataset,
    params: &FilterParams,
) -> Result<Vec<&'a Record>, PipelineError> {
    params.validate()?;

    let selections: Vec<CodeSelection> = params
        .categories
        .iter()
        .filter(|(_, selected)| !selected.is_empty())
        .map(|(field, selected)| CodeSelection {
            field: *field,
            codes: selected.iter().filter_map(|l| field.code_of(l)).collect(),
        })
        .collect();

    let subset = dataset
        .records()
        .iter()
        .filter(|record| {
            selections.iter().all(|sel| {
                record
                    .code(sel.field)
                    .is_some_and(|code| sel.codes.contains(&code))
            })
        })
        .filter(|record| {
            params.ranges.iter().all(|(field, range)| {
                record.value(*field).is_some_and(|v| range.contains(v))
            })
        })
        .collect();

    Ok(subset)
}
