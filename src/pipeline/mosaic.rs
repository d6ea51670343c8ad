//! Contingency tables and the Marimekko (mosaic) layout built on them

use std::collections::HashMap;

use serde::Serialize;

use super::schema::{Dimension, Record};

/// Record counts by combination of two dimensions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Crosstab {
    pub row_dimension: String,
    pub column_dimension: String,
    /// Row categories in first-seen order
    pub rows: Vec<String>,
    /// Column categories in first-seen order
    pub columns: Vec<String>,
    /// `counts[r][c]`
    pub counts: Vec<Vec<u64>>,
}

impl Crosstab {
    pub fn row_total(&self, row: usize) -> u64 {
        self.counts[row].iter().sum()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }
}

/// Count records for each (row, column) pair; records missing either side are skipped
pub fn crosstab(records: &[&Record], row: &Dimension, column: &Dimension) -> Crosstab {
    let mut table = Crosstab {
        row_dimension: row.name().to_string(),
        column_dimension: column.name().to_string(),
        ..Default::default()
    };
    let mut row_index: HashMap<&str, usize> = HashMap::new();
    let mut column_index: HashMap<&str, usize> = HashMap::new();
    let mut pairs: Vec<(usize, usize)> = Vec::new();

    for record in records {
        let (Some(r), Some(c)) = (row.label(record), column.label(record)) else {
            continue;
        };
        let r_idx = *row_index.entry(r).or_insert_with(|| {
            table.rows.push(r.to_string());
            table.rows.len() - 1
        });
        let c_idx = *column_index.entry(c).or_insert_with(|| {
            table.columns.push(c.to_string());
            table.columns.len() - 1
        });
        pairs.push((r_idx, c_idx));
    }

    table.counts = vec![vec![0; table.columns.len()]; table.rows.len()];
    for (r, c) in pairs {
        table.counts[r][c] += 1;
    }
    table
}

/// One stacked segment inside a mosaic bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MosaicSegment {
    pub category: String,
    pub count: u64,
    /// Share of this bar, in percent (conditional on the x category)
    pub percentage: f64,
}

/// One variable-width bar of the mosaic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MosaicColumn {
    pub category: String,
    pub count: u64,
    /// Fraction of all records; widths sum to 1.0
    pub share: f64,
    /// Cumulative share of the preceding bars
    pub start: f64,
    /// Midpoint of the bar, for label placement
    pub center: f64,
    pub segments: Vec<MosaicSegment>,
}

/// Marimekko layout: proportional bar widths, row-normalised stacked heights
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Mosaic {
    pub x_dimension: String,
    pub y_dimension: String,
    pub y_categories: Vec<String>,
    pub columns: Vec<MosaicColumn>,
}

/// Build the mosaic for `x` (bar widths) against `y` (stacked segments).
///
/// Only x categories with at least one record appear, so no percentage is
/// ever computed over a zero denominator. Each bar lists every y category
/// present in the subset.
pub fn build_mosaic(records: &[&Record], x: &Dimension, y: &Dimension) -> Mosaic {
    let table = crosstab(records, x, y);
    let total = table.total();

    let mut columns = Vec::with_capacity(table.rows.len());
    let mut start = 0.0;
    for (i, category) in table.rows.iter().enumerate() {
        let count = table.row_total(i);
        if count == 0 {
            continue;
        }
        let share = count as f64 / total as f64;
        let segments = table
            .columns
            .iter()
            .zip(&table.counts[i])
            .map(|(y_category, &n)| MosaicSegment {
                category: y_category.clone(),
                count: n,
                percentage: n as f64 * 100.0 / count as f64,
            })
            .collect();

        columns.push(MosaicColumn {
            category: category.clone(),
            count,
            share,
            start,
            center: start + share / 2.0,
            segments,
        });
        start += share;
    }

    Mosaic {
        x_dimension: table.row_dimension,
        y_dimension: table.column_dimension,
        y_categories: table.columns,
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::schema::{CategoricalField, NumericField};

    fn record(school: &str, score: f64) -> Record {
        Record::default()
            .with_level(CategoricalField::SchoolType, school)
            .unwrap()
            .with_value(NumericField::ExamScore, score)
    }

    #[test]
    fn test_conditional_percentages_sum_to_100() {
        // Public: 4 Low, 3 Medium, 3 High
        let mut data = Vec::new();
        data.extend((0..4).map(|_| record("Public", 40.0)));
        data.extend((0..3).map(|_| record("Public", 60.0)));
        data.extend((0..3).map(|_| record("Public", 90.0)));
        data.extend((0..10).map(|_| record("Private", 90.0)));
        let refs: Vec<&Record> = data.iter().collect();

        let mosaic = build_mosaic(
            &refs,
            &Dimension::from(CategoricalField::SchoolType),
            &Dimension::score_level(),
        );

        let public = &mosaic.columns[0];
        assert_eq!(public.category, "Public");
        let pcts: Vec<f64> = public.segments.iter().map(|s| s.percentage).collect();
        assert_eq!(pcts, vec![40.0, 30.0, 30.0]);
        assert!((pcts.iter().sum::<f64>() - 100.0).abs() < 1e-9);

        let private = &mosaic.columns[1];
        assert_eq!(private.segments.iter().map(|s| s.percentage).sum::<f64>(), 100.0);
        assert_eq!(private.segments[0].percentage, 0.0);

        assert_eq!(public.share, 0.5);
        assert_eq!(private.start, 0.5);
        assert_eq!(private.center, 0.75);
        let width: f64 = mosaic.columns.iter().map(|c| c.share).sum();
        assert!((width - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_records_missing_either_side_are_excluded() {
        let data = vec![record("Public", 40.0), record("Private", 150.0), Record::default()];
        let refs: Vec<&Record> = data.iter().collect();
        let mosaic = build_mosaic(
            &refs,
            &Dimension::from(CategoricalField::SchoolType),
            &Dimension::score_level(),
        );
        assert_eq!(mosaic.columns.len(), 1);
        assert_eq!(mosaic.columns[0].share, 1.0);
    }

    #[test]
    fn test_empty_subset() {
        let mosaic = build_mosaic(
            &[],
            &Dimension::from(CategoricalField::SchoolType),
            &Dimension::score_level(),
        );
        assert!(mosaic.columns.is_empty());
        assert!(mosaic.y_categories.is_empty());
    }

    #[test]
    fn test_crosstab_counts() {
        let data = vec![record("Public", 40.0), record("Public", 40.0), record("Private", 80.0)];
        let refs: Vec<&Record> = data.iter().collect();
        let table = crosstab(
            &refs,
            &Dimension::from(CategoricalField::SchoolType),
            &Dimension::score_level(),
        );
        assert_eq!(table.rows, vec!["Public", "Private"]);
        assert_eq!(table.columns, vec!["Low", "High"]);
        assert_eq!(table.counts, vec![vec![2, 0], vec![0, 1]]);
        assert_eq!(table.total(), 3);
    }
}
