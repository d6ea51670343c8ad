//! Assembles every derived table of the dashboard from one filtered subset

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::aggregate::{
    aggregate, category_shares, summarize_distribution, CategoryShare, DistributionSummary,
    GroupRow,
};
use super::config::DashboardConfig;
use super::correlation::{correlate, CorrelationMatrix};
use super::error::PipelineError;
use super::filter::{filter_records, FilterParams};
use super::flows::{build_flows, FlowTable};
use super::mosaic::{build_mosaic, Mosaic};
use super::outliers::trim_outliers;
use super::projection::{project, Axis, Projection};
use super::schema::{CategoricalField, Dataset, Dimension};

/// Charts of the dashboard, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Chart {
    BoxPlot,
    Treemap,
    ParallelCoordinates,
    Scatter,
    Correlation,
    Sankey,
    SplitViolin,
    Pie,
    Marimekko,
}

impl Chart {
    pub const ALL: [Chart; 9] = [
        Chart::BoxPlot,
        Chart::Treemap,
        Chart::ParallelCoordinates,
        Chart::Scatter,
        Chart::Correlation,
        Chart::Sankey,
        Chart::SplitViolin,
        Chart::Pie,
        Chart::Marimekko,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Chart::BoxPlot => "box_plot",
            Chart::Treemap => "treemap",
            Chart::ParallelCoordinates => "parallel_coordinates",
            Chart::Scatter => "scatter",
            Chart::Correlation => "correlation",
            Chart::Sankey => "sankey",
            Chart::SplitViolin => "split_violin",
            Chart::Pie => "pie",
            Chart::Marimekko => "marimekko",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Chart::BoxPlot => "Box Plot",
            Chart::Treemap => "Treemap",
            Chart::ParallelCoordinates => "Parallel Coordinates",
            Chart::Scatter => "Scatter Plot",
            Chart::Correlation => "Correlation Heatmap",
            Chart::Sankey => "Sankey Diagram",
            Chart::SplitViolin => "Split Violin",
            Chart::Pie => "Pie Chart",
            Chart::Marimekko => "Marimekko Chart",
        }
    }
}

impl fmt::Display for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Chart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Chart::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Chart::ALL.iter().map(|c| c.name()).collect();
                format!("Unknown chart '{}'. Options: {}", s, names.join(", "))
            })
    }
}

/// Parallel-coordinates rows plus the midpoint of the color scale
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParallelCoordinates {
    #[serde(flatten)]
    pub projection: Projection,
    /// Mean of the last axis (the color axis), NaN when there are no rows
    pub color_midpoint: f64,
}

/// Rows of a grouped table together with the names of their key columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grouped<T> {
    pub group_keys: Vec<String>,
    /// What the row values measure, e.g. `Exam_Score` or `mean(Exam_Score)`
    pub value: String,
    pub rows: Vec<T>,
}

/// Every derived table for one set of filter parameters
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_records: usize,
    /// Records left after categorical and range filters
    pub filtered_records: usize,
    /// Records the charts are built from (after optional outlier trimming)
    pub used_records: usize,
    pub color_dimension: String,
    pub box_plot: Grouped<DistributionSummary>,
    pub treemap: Grouped<GroupRow>,
    pub parallel_coordinates: ParallelCoordinates,
    pub scatter: Projection,
    pub correlation: CorrelationMatrix,
    pub sankey: FlowTable,
    pub split_violin: Grouped<DistributionSummary>,
    pub pie: Grouped<CategoryShare>,
    pub marimekko: Mosaic,
}

fn names(dimensions: &[Dimension]) -> Vec<String> {
    dimensions.iter().map(|d| d.name().to_string()).collect()
}

/// Run the whole pipeline: filter, optionally trim outliers, then build each chart table.
///
/// Pure: the same dataset, parameters and configuration always give the same tables.
pub fn build_dashboard(
    dataset: &Dataset,
    params: &FilterParams,
    config: &DashboardConfig,
) -> Result<Dashboard, PipelineError> {
    config.validate()?;
    let color_name = params.color_by.as_deref().unwrap_or(&config.default_color);
    let color = config.dimension(color_name)?;

    let filtered = filter_records(dataset, params)?;
    let filtered_records = filtered.len();
    let subset = if params.remove_outliers {
        trim_outliers(&filtered, &params.outlier_columns)
    } else {
        filtered
    };

    // Gender on the x axis, split by colour when the colour is something else
    let gender = Dimension::from(CategoricalField::Gender);
    let box_keys = if gender.name() == color.name() {
        vec![gender]
    } else {
        vec![gender, color.clone()]
    };
    let box_plot = Grouped {
        group_keys: names(&box_keys),
        value: config.box_value.column_name().to_string(),
        rows: summarize_distribution(&subset, &box_keys, config.box_value)?,
    };

    let treemap_keys = config.dimensions(&config.treemap_keys)?;
    let treemap = Grouped {
        group_keys: names(&treemap_keys),
        value: format!("{}({})", config.treemap_agg, config.treemap_value),
        rows: aggregate(
            &subset,
            &treemap_keys,
            config.treemap_value,
            config.treemap_agg,
        )?,
    };

    let parallel = project(&subset, &config.parallel_axes, None);
    let color_midpoint = match config.parallel_axes.len() {
        0 => f64::NAN,
        n => parallel.axis_mean(n - 1),
    };

    let scatter = project(
        &subset,
        &[Axis::Numeric(config.scatter_x), Axis::Numeric(config.scatter_y)],
        Some(&color),
    );

    let correlation = correlate(&subset, &config.correlation_columns)?;

    let sankey = build_flows(&subset, &config.dimensions(&config.sankey_stages)?)?;

    let split = config.dimension(&config.violin_split)?;
    let violin_keys = if split.name() == color.name() {
        vec![color.clone()]
    } else {
        vec![color.clone(), split]
    };
    let split_violin = Grouped {
        group_keys: names(&violin_keys),
        value: config.violin_value.column_name().to_string(),
        rows: summarize_distribution(&subset, &violin_keys, config.violin_value)?,
    };

    let pie_dimension = config.dimension(&config.pie_dimension)?;
    let pie = Grouped {
        group_keys: vec![pie_dimension.name().to_string()],
        value: "share".to_string(),
        rows: category_shares(&subset, &pie_dimension),
    };

    let marimekko = build_mosaic(
        &subset,
        &config.dimension(&config.mosaic_x)?,
        &config.dimension(&config.mosaic_y)?,
    );

    Ok(Dashboard {
        total_records: dataset.len(),
        filtered_records,
        used_records: subset.len(),
        color_dimension: color.name().to_string(),
        box_plot,
        treemap,
        parallel_coordinates: ParallelCoordinates {
            projection: parallel,
            color_midpoint,
        },
        scatter,
        correlation,
        sankey,
        split_violin,
        pie,
        marimekko,
    })
}
