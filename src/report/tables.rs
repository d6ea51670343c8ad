//! Flat tabular views of each chart and their terminal rendering
//!
//! Every chart table is flattened into a polars `DataFrame` once; the same
//! frame backs the CSV export and the comfy-table output.

use std::collections::HashSet;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;
use polars::prelude::*;

use crate::pipeline::{
    Chart, ColumnProfile, ColumnSummary, Dashboard, DistributionSummary, Grouped, Projection,
};

/// Rows shown per table in the terminal before truncating
pub const DEFAULT_PREVIEW_ROWS: usize = 20;

/// Give repeated column names a numeric suffix so the frame stays valid
fn unique_names<I: IntoIterator<Item = String>>(names: I) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|name| {
            let mut candidate = name.clone();
            let mut n = 2;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{}_{}", name, n);
                n += 1;
            }
            candidate
        })
        .collect()
}

/// One string column per group key, then the given value columns
fn grouped_frame<T>(
    grouped: &Grouped<T>,
    keys_of: impl Fn(&T) -> &[String],
    mut values: Vec<(String, Series)>,
) -> PolarsResult<DataFrame> {
    let mut named: Vec<(String, Series)> = grouped
        .group_keys
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let cells: Vec<String> = grouped
                .rows
                .iter()
                .map(|row| keys_of(row).get(i).cloned().unwrap_or_default())
                .collect();
            (key.clone(), Series::new(key.as_str().into(), cells))
        })
        .collect();
    named.append(&mut values);
    frame_from(named)
}

fn frame_from(named: Vec<(String, Series)>) -> PolarsResult<DataFrame> {
    let (names, series): (Vec<String>, Vec<Series>) = named.into_iter().unzip();
    let columns = unique_names(names)
        .into_iter()
        .zip(series)
        .map(|(name, s)| Column::from(s.with_name(name.as_str().into())))
        .collect();
    DataFrame::new(columns)
}

fn f64_series(name: &str, values: impl IntoIterator<Item = f64>) -> (String, Series) {
    let values: Vec<f64> = values.into_iter().collect();
    (name.to_string(), Series::new(name.into(), values))
}

fn u64_series(name: &str, values: impl IntoIterator<Item = u64>) -> (String, Series) {
    let values: Vec<u64> = values.into_iter().collect();
    (name.to_string(), Series::new(name.into(), values))
}

fn str_series(name: &str, values: impl IntoIterator<Item = String>) -> (String, Series) {
    let values: Vec<String> = values.into_iter().collect();
    (name.to_string(), Series::new(name.into(), values))
}

fn distribution_frame(grouped: &Grouped<DistributionSummary>) -> PolarsResult<DataFrame> {
    let rows = &grouped.rows;
    grouped_frame(
        grouped,
        |r| r.keys.as_slice(),
        vec![
            u64_series("count", rows.iter().map(|r| r.count as u64)),
            f64_series("mean", rows.iter().map(|r| r.mean)),
            f64_series("min", rows.iter().map(|r| r.min)),
            f64_series("q1", rows.iter().map(|r| r.q1)),
            f64_series("median", rows.iter().map(|r| r.median)),
            f64_series("q3", rows.iter().map(|r| r.q3)),
            f64_series("max", rows.iter().map(|r| r.max)),
            f64_series("whisker_low", rows.iter().map(|r| r.whisker_low)),
            f64_series("whisker_high", rows.iter().map(|r| r.whisker_high)),
            u64_series("outliers", rows.iter().map(|r| r.outliers.len() as u64)),
        ],
    )
}

fn projection_frame(projection: &Projection) -> PolarsResult<DataFrame> {
    let mut named: Vec<(String, Series)> = projection
        .axes
        .iter()
        .enumerate()
        .map(|(i, axis)| f64_series(axis, projection.rows.iter().map(|row| row[i])))
        .collect();
    if let Some(color) = &projection.color_dimension {
        named.push(str_series(color, projection.colors.iter().cloned()));
    }
    frame_from(named)
}

/// Flatten one chart table of `dashboard` into a DataFrame
pub fn chart_frame(dashboard: &Dashboard, chart: Chart) -> PolarsResult<DataFrame> {
    match chart {
        Chart::BoxPlot => distribution_frame(&dashboard.box_plot),
        Chart::SplitViolin => distribution_frame(&dashboard.split_violin),
        Chart::Treemap => {
            let treemap = &dashboard.treemap;
            grouped_frame(
                treemap,
                |r| r.keys.as_slice(),
                vec![
                    f64_series(&treemap.value, treemap.rows.iter().map(|r| r.value)),
                    u64_series("count", treemap.rows.iter().map(|r| r.count as u64)),
                ],
            )
        }
        Chart::ParallelCoordinates => {
            projection_frame(&dashboard.parallel_coordinates.projection)
        }
        Chart::Scatter => projection_frame(&dashboard.scatter),
        Chart::Correlation => {
            let matrix = &dashboard.correlation;
            let mut named = vec![str_series(
                "column",
                matrix.columns.iter().map(|c| c.column_name().to_string()),
            )];
            for (j, column) in matrix.columns.iter().enumerate() {
                named.push(f64_series(
                    column.column_name(),
                    (0..matrix.size()).map(|i| matrix.get(i, j)),
                ));
            }
            frame_from(named)
        }
        Chart::Sankey => {
            let flows = &dashboard.sankey;
            frame_from(vec![
                u64_series("source", flows.sources.iter().map(|&s| s as u64)),
                u64_series("target", flows.targets.iter().map(|&t| t as u64)),
                str_series(
                    "source_label",
                    flows.sources.iter().map(|&s| flows.labels[s].clone()),
                ),
                str_series(
                    "target_label",
                    flows.targets.iter().map(|&t| flows.labels[t].clone()),
                ),
                u64_series("weight", flows.weights.iter().copied()),
            ])
        }
        Chart::Pie => {
            let pie = &dashboard.pie;
            let key = pie.group_keys.first().map_or("category", String::as_str);
            frame_from(vec![
                str_series(key, pie.rows.iter().map(|r| r.category.clone())),
                u64_series("count", pie.rows.iter().map(|r| r.count as u64)),
                f64_series("percentage", pie.rows.iter().map(|r| r.percentage)),
            ])
        }
        Chart::Marimekko => {
            let mosaic = &dashboard.marimekko;
            let segments: Vec<_> = mosaic
                .columns
                .iter()
                .flat_map(|col| col.segments.iter().map(move |seg| (col, seg)))
                .collect();
            frame_from(vec![
                str_series(
                    &mosaic.x_dimension,
                    segments.iter().map(|(col, _)| col.category.clone()),
                ),
                str_series(
                    &mosaic.y_dimension,
                    segments.iter().map(|(_, seg)| seg.category.clone()),
                ),
                u64_series("count", segments.iter().map(|(_, seg)| seg.count)),
                f64_series("percentage", segments.iter().map(|(_, seg)| seg.percentage)),
                f64_series("width", segments.iter().map(|(col, _)| col.share)),
                f64_series("start", segments.iter().map(|(col, _)| col.start)),
                f64_series("center", segments.iter().map(|(col, _)| col.center)),
            ])
        }
    }
}

fn format_cell(value: AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Float64(v) if v.is_nan() => "NaN".to_string(),
        AnyValue::Float64(v) => format!("{:.2}", v),
        other => other.to_string(),
    }
}

/// Build a comfy-table view of `df`, keeping at most `max_rows` rows
pub fn frame_table(df: &DataFrame, max_rows: usize) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        df.get_column_names()
            .iter()
            .map(|name| Cell::new(name.as_str()).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );

    for row in 0..df.height().min(max_rows) {
        let cells: Vec<Cell> = df
            .get_columns()
            .iter()
            .map(|column| {
                let text = column.get(row).map(format_cell).unwrap_or_default();
                let cell = Cell::new(text);
                if column.dtype().is_primitive_numeric() {
                    cell.set_alignment(CellAlignment::Right)
                } else {
                    cell
                }
            })
            .collect();
        table.add_row(cells);
    }
    table
}

/// Print one chart table with a title, truncated to `max_rows`
pub fn display_chart(dashboard: &Dashboard, chart: Chart, max_rows: usize) -> PolarsResult<()> {
    let df = chart_frame(dashboard, chart)?;

    println!();
    println!(
        "    {} {}",
        style("📈").cyan(),
        style(chart.title().to_uppercase()).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());

    if df.height() == 0 {
        println!("      {}", style("(no rows for the current filters)").dim());
        return Ok(());
    }

    // Indent the table
    for line in frame_table(&df, max_rows).to_string().lines() {
        println!("    {}", line);
    }
    if df.height() > max_rows {
        println!(
            "      {}",
            style(format!("... {} more row(s)", df.height() - max_rows)).dim()
        );
    }
    if chart == Chart::ParallelCoordinates {
        println!(
            "      Color midpoint: {}",
            style(format!("{:.2}", dashboard.parallel_coordinates.color_midpoint)).yellow()
        );
    }
    Ok(())
}

/// Print every chart table in dashboard order
pub fn display_dashboard(dashboard: &Dashboard, max_rows: usize) -> PolarsResult<()> {
    for chart in Chart::ALL {
        display_chart(dashboard, chart, max_rows)?;
    }
    Ok(())
}

fn summary_text(summary: &ColumnSummary) -> String {
    match summary {
        ColumnSummary::Categorical { levels } => levels
            .iter()
            .map(|l| format!("{} {:.1}%", l.category, l.percentage))
            .collect::<Vec<_>>()
            .join(", "),
        ColumnSummary::Numeric {
            profile: Some(profile),
        } => format!(
            "min {:.2} / mean {:.2} / max {:.2}",
            profile.min, profile.mean, profile.max
        ),
        ColumnSummary::Numeric { profile: None } => "no values".to_string(),
    }
}

/// Print the per-column profile of a dataset
pub fn display_profiles(profiles: &[ColumnProfile]) {
    println!();
    println!(
        "    {} {}",
        style("🗂️").cyan(),
        style("COLUMN PROFILE").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Column").add_attribute(Attribute::Bold),
        Cell::new("Missing").add_attribute(Attribute::Bold),
        Cell::new("Missing %").add_attribute(Attribute::Bold),
        Cell::new("Values").add_attribute(Attribute::Bold),
    ]);

    for profile in profiles {
        let missing_pct = Cell::new(format!("{:.1}%", profile.missing_ratio * 100.0))
            .set_alignment(CellAlignment::Right);
        table.add_row(vec![
            Cell::new(&profile.column),
            Cell::new(profile.missing).set_alignment(CellAlignment::Right),
            if profile.missing > 0 {
                missing_pct.fg(Color::Yellow)
            } else {
                missing_pct
            },
            Cell::new(summary_text(&profile.summary)),
        ]);
    }

    // Indent the table
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}
