//! ScoreLens: Student Performance Dashboard CLI
//!
//! Loads a student performance CSV, applies filters and optional outlier
//! trimming, and prints or exports every derived dashboard table.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use scorelens::cli::{confirm_export, prompt_category_filters, Cli, Commands};
use scorelens::pipeline::{build_dashboard, describe_dataset, load_dataset, DashboardConfig};
use scorelens::report::{
    display_chart, display_dashboard, display_profiles, export_chart_csvs, export_dashboard_json,
    package_dashboard, ExportMetadata, RunSummary, DEFAULT_PREVIEW_ROWS,
};
use scorelens::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_count, print_info, print_step_header, print_step_time, print_success,
    print_warning,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle subcommands
    if let Some(command) = &cli.command {
        return match command {
            Commands::Describe {
                input,
                infer_schema_length,
            } => run_describe(input, *infer_schema_length),
        };
    }

    let input = cli.input().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Use -i/--input to specify a file.")
    })?;

    let (config, config_path) = DashboardConfig::load_or_default(cli.config.as_deref())?;

    let mut params = cli.filter_params()?;
    if cli.interactive {
        params = prompt_category_filters(params)?;
    }
    params.validate().context("Invalid filter parameters")?;

    let color_by = params
        .color_by
        .clone()
        .unwrap_or_else(|| config.default_color.clone());

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        input,
        params.categories.values().filter(|s| !s.is_empty()).count() + params.ranges.len(),
        params.remove_outliers,
        &color_by,
        cli.output.as_deref(),
    );
    if let Some(path) = &config_path {
        print_info(&format!("Using dashboard config {}", path.display()));
    }

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading CSV...");
    let dataset = load_dataset(input, cli.infer_schema_length)?;
    finish_with_success(&spinner, "Dataset loaded");
    print_count("record(s)", dataset.len(), None);
    let load_elapsed = step_start.elapsed();
    print_step_time(load_elapsed);

    // Step 2: Filter and derive tables
    print_step_header(2, "Build Dashboard Tables");
    let step_start = Instant::now();
    let spinner = create_spinner("Filtering and aggregating...");
    let dashboard = build_dashboard(&dataset, &params, &config)?;
    if dashboard.used_records == 0 {
        finish_with_warning(&spinner, "No records match the current filters");
    } else {
        finish_with_success(&spinner, "Dashboard tables built");
    }
    print_count("record(s) after filters", dashboard.filtered_records, None);
    if params.remove_outliers {
        print_count(
            "record(s) after outlier trimming",
            dashboard.used_records,
            Some("(1.5 x IQR)"),
        );
    }
    let build_elapsed = step_start.elapsed();
    print_step_time(build_elapsed);

    let mut summary = RunSummary::new(&dashboard, &params);
    summary.set_load_time(load_elapsed);
    summary.set_build_time(build_elapsed);

    // Step 3: Show tables
    print_step_header(3, "Chart Tables");
    match cli.chart {
        Some(chart) => display_chart(&dashboard, chart, DEFAULT_PREVIEW_ROWS)?,
        None => display_dashboard(&dashboard, DEFAULT_PREVIEW_ROWS)?,
    }

    // Step 4: Export
    if cli.has_exports() {
        print_step_header(4, "Export");
        let proceed = if cli.interactive && !cli.no_confirm {
            confirm_export(scorelens::pipeline::Chart::ALL.len())?
        } else {
            true
        };

        if proceed {
            let step_start = Instant::now();

            if let Some(path) = &cli.output {
                let metadata = ExportMetadata::new(input, &params, &config);
                export_dashboard_json(&dashboard, metadata, path)?;
                print_success(&format!("Saved JSON to {}", path.display()));
                summary.add_export(format!("JSON: {}", path.display()));
            }

            if let Some(dir) = &cli.csv_dir {
                let written = export_chart_csvs(&dashboard, dir)?;
                print_success(&format!(
                    "Saved {} CSV file(s) to {}",
                    written.len(),
                    dir.display()
                ));
                summary.add_export(format!("CSV: {}", dir.display()));
            }

            if let Some(path) = &cli.bundle {
                let metadata = ExportMetadata::new(input, &params, &config);
                package_dashboard(&dashboard, metadata, path)?;
                print_success(&format!("Saved bundle to {}", path.display()));
                summary.add_export(format!("Bundle: {}", path.display()));
            }

            let export_elapsed = step_start.elapsed();
            summary.set_export_time(export_elapsed);
            print_step_time(export_elapsed);
        } else {
            print_warning("Export skipped");
        }
    }

    summary.display();
    print_completion();

    Ok(())
}

/// Print the per-column profile of a dataset
fn run_describe(input: &Path, infer_schema_length: usize) -> Result<()> {
    let spinner = create_spinner("Reading CSV...");
    let dataset = load_dataset(input, infer_schema_length)?;
    finish_with_success(&spinner, "Dataset loaded");

    println!(
        "\n    {} {} record(s) in {}",
        style("✧").cyan(),
        style(dataset.len()).yellow().bold(),
        input.display()
    );
    display_profiles(&describe_dataset(&dataset));
    Ok(())
}
