//! Group-by summaries over a filtered subset
//!
//! Groups appear in the order their key tuple is first seen in the subset,
//! so identical input always yields identical output. Records with a missing
//! key or value are left out of the group they would otherwise join.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::outliers::{percentile_sorted, sorted_finite, IqrBounds};
use super::schema::{Dimension, NumericField, Record};

/// Aggregation applied to each group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggFn {
    #[default]
    Mean,
    Median,
    Sum,
    Min,
    Max,
    Count,
}

impl AggFn {
    fn apply(self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        match self {
            AggFn::Mean => values.iter().sum::<f64>() / values.len() as f64,
            AggFn::Median => percentile_sorted(&sorted_finite(values.iter().copied()), 0.5)
                .unwrap_or(f64::NAN),
            AggFn::Sum => values.iter().sum(),
            AggFn::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            AggFn::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            AggFn::Count => values.len() as f64,
        }
    }
}

impl fmt::Display for AggFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggFn::Mean => "mean",
            AggFn::Median => "median",
            AggFn::Sum => "sum",
            AggFn::Min => "min",
            AggFn::Max => "max",
            AggFn::Count => "count",
        };
        f.write_str(name)
    }
}

impl FromStr for AggFn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(AggFn::Mean),
            "median" => Ok(AggFn::Median),
            "sum" => Ok(AggFn::Sum),
            "min" => Ok(AggFn::Min),
            "max" => Ok(AggFn::Max),
            "count" => Ok(AggFn::Count),
            _ => Err(format!(
                "Unknown aggregation: '{}'. Use mean, median, sum, min, max or count.",
                s
            )),
        }
    }
}

/// Insertion-ordered grouping of items by key
pub(crate) struct OrderedGroups<K, V> {
    index: HashMap<K, usize>,
    groups: Vec<(K, Vec<V>)>,
}

impl<K: Hash + Eq + Clone, V> OrderedGroups<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, key: K, value: V) {
        match self.index.get(&key) {
            Some(&pos) => self.groups[pos].1.push(value),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![value]));
            }
        }
    }

    pub(crate) fn into_groups(self) -> Vec<(K, Vec<V>)> {
        self.groups
    }
}

/// Key tuple of `record` across `dims`, or `None` if any part is missing
pub(crate) fn key_tuple(dims: &[Dimension], record: &Record) -> Option<Vec<String>> {
    dims.iter()
        .map(|d| d.label(record).map(str::to_string))
        .collect()
}

/// One aggregated group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub keys: Vec<String>,
    pub value: f64,
    pub count: usize,
}

/// Aggregate `value` per distinct key tuple present in the subset
pub fn aggregate(
    records: &[&Record],
    group_keys: &[Dimension],
    value: NumericField,
    agg: AggFn,
) -> Result<Vec<GroupRow>, PipelineError> {
    if group_keys.is_empty() {
        return Err(PipelineError::NoGroupKeys);
    }

    let mut groups = OrderedGroups::new();
    for record in records {
        if let (Some(keys), Some(v)) = (key_tuple(group_keys, record), record.value(value)) {
            groups.push(keys, v);
        }
    }

    Ok(groups
        .into_groups()
        .into_iter()
        .map(|(keys, values)| GroupRow {
            keys,
            value: agg.apply(&values),
            count: values.len(),
        })
        .collect())
}

/// Five-number summary plus whiskers and outliers for one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub keys: Vec<String>,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Smallest value inside the lower 1.5 x IQR fence
    pub whisker_low: f64,
    /// Largest value inside the upper 1.5 x IQR fence
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

fn summarize(keys: Vec<String>, values: Vec<f64>) -> Option<DistributionSummary> {
    let sorted = sorted_finite(values);
    let bounds = IqrBounds::from_values(sorted.iter().copied())?;
    let first = *sorted.first()?;
    let last = *sorted.last()?;

    let whisker_low = sorted
        .iter()
        .copied()
        .find(|&v| v >= bounds.lower)
        .unwrap_or(bounds.q1);
    let whisker_high = sorted
        .iter()
        .rev()
        .copied()
        .find(|&v| v <= bounds.upper)
        .unwrap_or(bounds.q3);

    Some(DistributionSummary {
        keys,
        count: sorted.len(),
        mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
        min: first,
        q1: bounds.q1,
        median: percentile_sorted(&sorted, 0.5)?,
        q3: bounds.q3,
        max: last,
        whisker_low,
        whisker_high,
        outliers: sorted
            .iter()
            .copied()
            .filter(|&v| !bounds.contains(v))
            .collect(),
    })
}

/// Distribution of `value` per key tuple (box plots and split violins)
pub fn summarize_distribution(
    records: &[&Record],
    group_keys: &[Dimension],
    value: NumericField,
) -> Result<Vec<DistributionSummary>, PipelineError> {
    if group_keys.is_empty() {
        return Err(PipelineError::NoGroupKeys);
    }

    let mut groups = OrderedGroups::new();
    for record in records {
        if let (Some(keys), Some(v)) = (key_tuple(group_keys, record), record.value(value)) {
            groups.push(keys, v);
        }
    }

    Ok(groups
        .into_groups()
        .into_iter()
        .filter_map(|(keys, values)| summarize(keys, values))
        .collect())
}

/// Count and share of one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub count: usize,
    /// Percentage of records with a known value for the dimension
    pub percentage: f64,
}

/// Value counts along one dimension (pie slices)
pub fn category_shares(records: &[&Record], dimension: &Dimension) -> Vec<CategoryShare> {
    let mut groups: OrderedGroups<&str, ()> = OrderedGroups::new();
    for record in records {
        if let Some(label) = dimension.label(record) {
            groups.push(label, ());
        }
    }

    let groups = groups.into_groups();
    let total: usize = groups.iter().map(|(_, members)| members.len()).sum();

    groups
        .into_iter()
        .map(|(category, members)| CategoryShare {
            category: category.to_string(),
            count: members.len(),
            percentage: members.len() as f64 * 100.0 / total as f64,
        })
        .collect()
}
