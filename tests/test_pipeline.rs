//! Integration tests for the full dashboard pipeline

use polars::prelude::Column;
use scorelens::pipeline::*;
use scorelens::report::{
    chart_csv, chart_frame, export_chart_csvs, export_dashboard_json, package_dashboard,
    ExportMetadata, BUNDLE_JSON_NAME,
};

#[path = "common/mod.rs"]
mod common;

use common::*;

fn labels(dataset: &Dataset, dimension: &Dimension) -> Vec<Option<String>> {
    dataset
        .records()
        .iter()
        .map(|r| dimension.label(r).map(str::to_string))
        .collect()
}

fn some(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|v| Some(v.to_string())).collect()
}

fn default_dashboard() -> Dashboard {
    build_dashboard(
        &student_dataset(),
        &FilterParams::new(),
        &DashboardConfig::default(),
    )
    .unwrap()
}

#[test]
fn test_end_to_end_derived_labels() {
    let mut df = create_student_dataframe().head(Some(4));
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);
    let dataset = load_dataset(&csv_path, 100).unwrap();

    // Exam scores [45, 60, 80, 95], hours studied [1, 3, 6, 10]
    assert_eq!(
        labels(&dataset, &Dimension::score_level()),
        some(&["Low", "Medium", "High", "High"])
    );
    assert_eq!(
        labels(&dataset, &Dimension::study_hours_group()),
        some(&["0-2", "2-5", "5-8", "8-12"])
    );
}

#[test]
fn test_end_to_end_medium_band() {
    let mut df = create_student_dataframe().head(Some(4));
    df.with_column(Column::new("Exam_Score".into(), [45i64, 60, 70, 95]))
        .unwrap();
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);
    let dataset = load_dataset(&csv_path, 100).unwrap();

    assert_eq!(
        labels(&dataset, &Dimension::score_level()),
        some(&["Low", "Medium", "Medium", "High"])
    );
}

#[test]
fn test_tutoring_groups() {
    let dataset = student_dataset();
    assert_eq!(
        labels(&dataset, &Dimension::TutoringGroup),
        some(&["0", "2", "1", "4+", "3", "4+", "0", "1"])
    );
}

#[test]
fn test_dashboard_record_counts() {
    let dashboard = default_dashboard();
    assert_eq!(dashboard.total_records, 8);
    assert_eq!(dashboard.filtered_records, 8);
    assert_eq!(dashboard.used_records, 8);
    assert_eq!(dashboard.color_dimension, "Gender");
}

#[test]
fn test_sankey_nodes_and_edges() {
    let flows = default_dashboard().sankey;

    assert_eq!(
        flows.labels,
        vec![
            "0-2", "2-5", "5-8", "8-12", // Study_Hours_Group
            "Low", "Medium", "High", // Motivation_Level
            "Low", "Medium", "High", // Score_Level
        ]
    );
    assert_eq!(flows.sources, vec![0, 1, 1, 2, 3, 4, 4, 5, 5, 6]);
    assert_eq!(flows.targets, vec![4, 4, 5, 5, 6, 7, 8, 8, 9, 9]);
    assert_eq!(flows.weights, vec![2, 1, 1, 2, 2, 2, 1, 2, 1, 2]);

    // Every record flows through each stage exactly once
    assert_eq!(flows.outgoing_weight(0), 8);
    assert_eq!(flows.outgoing_weight(1), 8);
}

#[test]
fn test_pie_shares() {
    let pie = default_dashboard().pie;
    assert_eq!(pie.group_keys, vec!["Score_Level"]);

    let shares: Vec<(&str, usize, f64)> = pie
        .rows
        .iter()
        .map(|s| (s.category.as_str(), s.count, s.percentage))
        .collect();
    assert_eq!(
        shares,
        vec![("Low", 2, 25.0), ("Medium", 3, 37.5), ("High", 3, 37.5)]
    );
}

#[test]
fn test_marimekko_layout() {
    let mosaic = default_dashboard().marimekko;
    assert_eq!(mosaic.x_dimension, "School_Type");
    assert_eq!(mosaic.y_categories, vec!["Low", "Medium", "High"]);

    let public = &mosaic.columns[0];
    assert_eq!(public.category, "Public");
    assert_eq!(public.share, 0.625);
    let pcts: Vec<f64> = public.segments.iter().map(|s| s.percentage).collect();
    assert_eq!(pcts, vec![40.0, 40.0, 20.0]);

    let private = &mosaic.columns[1];
    assert_eq!(private.start, 0.625);
    assert_eq!(private.segments[0].count, 0, "Zero cells are kept");
    assert_close(private.segments[2].percentage, 200.0 / 3.0, 1e-9);

    for column in &mosaic.columns {
        let total: f64 = column.segments.iter().map(|s| s.percentage).sum();
        assert_close(total, 100.0, 1e-9);
    }
}

#[test]
fn test_treemap_skips_incomplete_key_tuples() {
    let treemap = default_dashboard().treemap;
    assert_eq!(
        treemap.group_keys,
        vec!["School_Type", "Parental_Education_Level", "Gender"]
    );
    // The record with no parental education level has no key tuple
    assert_eq!(treemap.rows.len(), 7);
    assert_eq!(treemap.rows.iter().map(|r| r.count).sum::<usize>(), 7);
    assert_eq!(treemap.rows[0].keys, vec!["Public", "College", "Male"]);
    assert_eq!(treemap.rows[0].value, 45.0);
}

#[test]
fn test_box_plot_by_gender() {
    let box_plot = default_dashboard().box_plot;
    assert_eq!(box_plot.group_keys, vec!["Gender"]);

    let male = &box_plot.rows[0];
    assert_eq!(male.keys, vec!["Male"]);
    assert_eq!(male.count, 4);
    assert_eq!(male.median, 62.5);

    let female = &box_plot.rows[1];
    assert_eq!(female.median, 74.0);
}

#[test]
fn test_parallel_coordinates_midpoint() {
    let parallel = default_dashboard().parallel_coordinates;
    assert_eq!(parallel.projection.rows.len(), 8);
    assert_eq!(parallel.projection.axes.len(), 6);
    assert_eq!(parallel.color_midpoint, 67.875);
}

#[test]
fn test_color_by_changes_grouping() {
    let params = FilterParams {
        color_by: Some("Score_Level".to_string()),
        ..Default::default()
    };
    let dashboard =
        build_dashboard(&student_dataset(), &params, &DashboardConfig::default()).unwrap();

    assert_eq!(dashboard.color_dimension, "Score_Level");
    assert_eq!(dashboard.scatter.colors.len(), 8);
    assert_eq!(dashboard.split_violin.group_keys, vec!["Score_Level", "Gender"]);
}

#[test]
fn test_box_plot_keeps_gender_when_colored_by_other_dimension() {
    let params = FilterParams {
        color_by: Some("Score_Level".to_string()),
        ..Default::default()
    };
    let dashboard =
        build_dashboard(&student_dataset(), &params, &DashboardConfig::default()).unwrap();
    let box_plot = dashboard.box_plot;

    assert_eq!(box_plot.group_keys, vec!["Gender", "Score_Level"]);
    assert_eq!(box_plot.rows.len(), 6);
    assert_eq!(box_plot.rows[0].keys, vec!["Male", "Low"]);

    // 95 and 88
    let female_high = &box_plot.rows[3];
    assert_eq!(female_high.keys, vec!["Female", "High"]);
    assert_eq!(female_high.count, 2);
    assert_eq!(female_high.median, 91.5);
}

#[test]
fn test_filtered_dashboard_uses_subset_everywhere() {
    let params = FilterParams::new().select(CategoricalField::SchoolType, ["Private"]);
    let dashboard =
        build_dashboard(&student_dataset(), &params, &DashboardConfig::default()).unwrap();

    assert_eq!(dashboard.used_records, 3);
    assert_eq!(dashboard.scatter.rows.len(), 3);
    assert_eq!(dashboard.parallel_coordinates.projection.rows.len(), 3);
    assert_eq!(dashboard.marimekko.columns.len(), 1);
    assert_eq!(dashboard.sankey.outgoing_weight(0), 3);
}

#[test]
fn test_empty_subset_builds_empty_tables() {
    let params = FilterParams::new().range(NumericField::ExamScore, 99.0, 100.0);
    let dashboard =
        build_dashboard(&student_dataset(), &params, &DashboardConfig::default()).unwrap();

    assert_eq!(dashboard.used_records, 0);
    assert!(dashboard.pie.rows.is_empty());
    assert_eq!(dashboard.sankey.edge_count(), 0);
    assert!(dashboard.correlation.get(0, 1).is_nan());

    for chart in Chart::ALL {
        let df = chart_frame(&dashboard, chart).unwrap();
        if chart != Chart::Correlation {
            assert_eq!(df.height(), 0, "{} should have no rows", chart);
        }
    }
}

#[test]
fn test_outlier_toggle_on_fixture() {
    let params = FilterParams {
        remove_outliers: true,
        ..Default::default()
    };
    let dashboard =
        build_dashboard(&student_dataset(), &params, &DashboardConfig::default()).unwrap();
    // No fixture value lies outside 1.5 x IQR
    assert_eq!(dashboard.used_records, dashboard.filtered_records);
}

#[test]
fn test_config_file_overrides_bins() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"score_bins": {"edges": [0, 60, 100], "labels": ["Fail", "Pass"]}}"#,
    )
    .unwrap();

    let (config, used) = DashboardConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(used.as_deref(), Some(path.as_path()));

    let dashboard = build_dashboard(&student_dataset(), &FilterParams::new(), &config).unwrap();
    let categories: Vec<&str> = dashboard
        .pie
        .rows
        .iter()
        .map(|s| s.category.as_str())
        .collect();
    assert_eq!(categories, vec!["Fail", "Pass"]);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"score_bins": {"edges": [0, 60, 50], "labels": ["a", "b"]}}"#,
    )
    .unwrap();

    assert!(DashboardConfig::load(&path).is_err());
}

#[test]
fn test_json_export() {
    let dashboard = default_dashboard();
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("dashboard.json");
    let params = FilterParams::new();
    let config = DashboardConfig::default();

    export_dashboard_json(
        &dashboard,
        ExportMetadata::new(std::path::Path::new("students.csv"), &params, &config),
        &path,
    )
    .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["metadata"]["input_file"], "students.csv");
    assert_eq!(json["dashboard"]["total_records"], 8);
    assert_eq!(json["dashboard"]["sankey"]["weights"][0], 2);
    assert_eq!(json["dashboard"]["pie"]["rows"][0]["category"], "Low");
    assert_eq!(json["dashboard"]["correlation"]["columns"][0], "Hours_Studied");
}

#[test]
fn test_csv_export_writes_one_file_per_chart() {
    let dashboard = default_dashboard();
    let temp_dir = tempfile::TempDir::new().unwrap();
    let dir = temp_dir.path().join("tables");

    let written = export_chart_csvs(&dashboard, &dir).unwrap();
    assert_eq!(written.len(), Chart::ALL.len());
    assert!(written.iter().all(|p| p.is_file()));

    let sankey = std::fs::read_to_string(dir.join("sankey.csv")).unwrap();
    let header = sankey.lines().next().unwrap();
    assert_eq!(header, "source,target,source_label,target_label,weight");
    assert_eq!(sankey.lines().count(), 11);
}

#[test]
fn test_chart_csv_pie() {
    let csv = chart_csv(&default_dashboard(), Chart::Pie).unwrap();
    let text = String::from_utf8(csv).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Score_Level,count,percentage");
    assert_eq!(lines.len(), 4);
}

#[test]
fn test_bundle_contains_json_and_csvs() {
    let dashboard = default_dashboard();
    let temp_dir = tempfile::TempDir::new().unwrap();
    let zip_path = temp_dir.path().join("bundle.zip");

    package_dashboard(
        &dashboard,
        ExportMetadata::new(
            std::path::Path::new("students.csv"),
            &FilterParams::new(),
            &DashboardConfig::default(),
        ),
        &zip_path,
    )
    .unwrap();

    let file = std::fs::File::open(&zip_path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    assert_eq!(archive.len(), Chart::ALL.len() + 1);
    assert!(archive.by_name(BUNDLE_JSON_NAME).is_ok());
    assert!(archive.by_name("marimekko.csv").is_ok());
}
