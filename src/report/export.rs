//! Dashboard export: pretty JSON with run metadata, per-chart CSV and zip bundles

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::{CsvWriter, SerWriter};
use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::tables::chart_frame;
use crate::pipeline::{Chart, Dashboard, DashboardConfig, FilterParams};

/// Name of the JSON entry inside a bundle
pub const BUNDLE_JSON_NAME: &str = "dashboard.json";

/// Metadata about the run that produced the export
#[derive(Serialize)]
pub struct ExportMetadata {
    /// Timestamp of the export (RFC 3339)
    pub timestamp: String,
    pub scorelens_version: String,
    pub input_file: String,
    /// Filter parameters the tables were computed with
    pub filters: FilterParams,
    /// Dashboard configuration the tables were computed with
    pub config: DashboardConfig,
}

impl ExportMetadata {
    pub fn new(input: &Path, filters: &FilterParams, config: &DashboardConfig) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            scorelens_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: input.display().to_string(),
            filters: filters.clone(),
            config: config.clone(),
        }
    }
}

/// Complete dashboard export with metadata
#[derive(Serialize)]
pub struct DashboardExport<'a> {
    pub metadata: ExportMetadata,
    pub dashboard: &'a Dashboard,
}

/// Serialize the dashboard and its metadata as pretty JSON
pub fn dashboard_json(dashboard: &Dashboard, metadata: ExportMetadata) -> Result<String> {
    let export = DashboardExport {
        metadata,
        dashboard,
    };
    serde_json::to_string_pretty(&export).context("Failed to serialize dashboard to JSON")
}

/// Export every chart table to a JSON file
pub fn export_dashboard_json(
    dashboard: &Dashboard,
    metadata: ExportMetadata,
    output_path: &Path,
) -> Result<()> {
    let json = dashboard_json(dashboard, metadata)?;
    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write dashboard to {}", output_path.display()))?;
    Ok(())
}

/// Render one chart table as CSV bytes
pub fn chart_csv(dashboard: &Dashboard, chart: Chart) -> Result<Vec<u8>> {
    let mut df = chart_frame(dashboard, chart)
        .with_context(|| format!("Failed to build {} table", chart))?;
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .finish(&mut df)
        .with_context(|| format!("Failed to write {} as CSV", chart))?;
    Ok(buffer)
}

/// Write one `<chart>.csv` per chart table into `dir`, creating it if needed.
/// Returns the written paths in dashboard order.
pub fn export_chart_csvs(dashboard: &Dashboard, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let mut written = Vec::with_capacity(Chart::ALL.len());
    for chart in Chart::ALL {
        let path = dir.join(format!("{}.csv", chart.name()));
        let mut df = chart_frame(dashboard, chart)
            .with_context(|| format!("Failed to build {} table", chart))?;
        let mut file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        CsvWriter::new(&mut file)
            .finish(&mut df)
            .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// Package the JSON export and one CSV per chart into a zip archive
///
/// Creates a zip file containing:
/// - dashboard.json - every chart table with run metadata
/// - <chart>.csv - one flat table per chart
pub fn package_dashboard(
    dashboard: &Dashboard,
    metadata: ExportMetadata,
    zip_path: &Path,
) -> Result<()> {
    let zip_file = File::create(zip_path)
        .with_context(|| format!("Failed to create zip file: {}", zip_path.display()))?;

    let mut zip = ZipWriter::new(zip_file);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    let mut add_entry = |name: &str, content: &[u8]| -> Result<()> {
        zip.start_file(name, options)
            .with_context(|| format!("Failed to add {} to zip", name))?;
        zip.write_all(content)?;
        Ok(())
    };

    add_entry(BUNDLE_JSON_NAME, dashboard_json(dashboard, metadata)?.as_bytes())?;
    for chart in Chart::ALL {
        add_entry(&format!("{}.csv", chart.name()), &chart_csv(dashboard, chart)?)?;
    }

    zip.finish().context("Failed to finalize zip file")?;
    Ok(())
}
