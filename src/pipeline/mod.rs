//! Pipeline module - loads the dataset and derives every dashboard table

pub mod aggregate;
pub mod binning;
pub mod config;
pub mod correlation;
pub mod dashboard;
pub mod describe;
pub mod error;
pub mod filter;
pub mod flows;
pub mod loader;
pub mod mosaic;
pub mod outliers;
pub mod projection;
pub mod schema;

pub use aggregate::{
    aggregate, category_shares, summarize_distribution, AggFn, CategoryShare,
    DistributionSummary, GroupRow,
};
pub use binning::{bin_numeric, tutoring_group, Binning};
pub use config::DashboardConfig;
pub use correlation::{correlate, CorrelationMatrix};
pub use dashboard::{build_dashboard, Chart, Dashboard, Grouped, ParallelCoordinates};
pub use describe::{describe_dataset, ColumnProfile, ColumnSummary, NumericProfile};
pub use error::{DatasetError, PipelineError};
pub use filter::{filter_records, FilterParams, NumericRange};
pub use flows::{build_flows, FlowTable};
pub use loader::{dataset_from_frame, load_dataset};
pub use mosaic::{build_mosaic, crosstab, Crosstab, Mosaic, MosaicColumn, MosaicSegment};
pub use outliers::{trim_outliers, IqrBounds};
pub use projection::{project, Axis, Projection};
pub use schema::{CategoricalField, Dataset, Dimension, NumericField, Record};
