//! Tests for dataset loading and schema validation

use scorelens::pipeline::{load_dataset, CategoricalField, NumericField};

#[path = "common/mod.rs"]
mod common;

use common::*;

const HEADER: &str = "School_Type,Gender,Parental_Education_Level,Teacher_Quality,Motivation_Level,Peer_Influence,Distance_from_Home,Hours_Studied,Attendance,Sleep_Hours,Previous_Scores,Exam_Score,Tutoring_Sessions";

#[test]
fn test_load_student_csv() {
    let mut df = create_student_dataframe();
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);

    let dataset = load_dataset(&csv_path, 100).unwrap();

    assert_eq!(dataset.len(), 8, "Should load every row");
    let first = &dataset.records()[0];
    assert_eq!(first.level(CategoricalField::SchoolType), Some("Public"));
    assert_eq!(first.level(CategoricalField::MotivationLevel), Some("Low"));
    assert_eq!(first.value(NumericField::HoursStudied), Some(1.0));
    assert_eq!(first.value(NumericField::ExamScore), Some(45.0));

    let last = &dataset.records()[7];
    assert_eq!(
        last.level(CategoricalField::ParentalEducationLevel),
        None,
        "Empty cell should load as missing"
    );
}

#[test]
fn test_full_schema_scan() {
    let mut df = create_student_dataframe();
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);

    let dataset = load_dataset(&csv_path, 0).unwrap();
    assert_eq!(dataset.len(), 8);
}

#[test]
fn test_extra_columns_and_whitespace() {
    let content = format!(
        "{},Student_Id\nPublic, Female ,College,High,Low,Positive,Near,5,80,7,70,72,1,s-001\n",
        HEADER
    );
    let (_temp_dir, csv_path) = create_temp_csv_text(&content);

    let dataset = load_dataset(&csv_path, 100).unwrap();
    assert_eq!(dataset.len(), 1);
    assert_eq!(
        dataset.records()[0].level(CategoricalField::Gender),
        Some("Female")
    );
}

#[test]
fn test_missing_numeric_cell() {
    let content = format!(
        "{}\nPublic,Male,College,High,Low,Positive,Near,,80,7,70,72,1\nPrivate,Female,College,High,Low,Positive,Near,4,80,7,70,72,1\n",
        HEADER
    );
    let (_temp_dir, csv_path) = create_temp_csv_text(&content);

    let dataset = load_dataset(&csv_path, 100).unwrap();
    assert_eq!(dataset.records()[0].value(NumericField::HoursStudied), None);
    assert_eq!(dataset.records()[1].value(NumericField::HoursStudied), Some(4.0));
}

#[test]
fn test_missing_required_column_is_fatal() {
    let mut df = create_student_dataframe().drop("Exam_Score").unwrap();
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);

    let err = load_dataset(&csv_path, 100).unwrap_err();
    let message = format!("{:#}", err);
    assert!(
        message.contains("Exam_Score"),
        "Error should name the missing column, got: {}",
        message
    );
}

#[test]
fn test_unknown_category_label_is_fatal() {
    let content = format!(
        "{}\nPublic,Robot,College,High,Low,Positive,Near,5,80,7,70,72,1\n",
        HEADER
    );
    let (_temp_dir, csv_path) = create_temp_csv_text(&content);

    let err = load_dataset(&csv_path, 100).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("Robot"), "got: {}", message);
    assert!(message.contains("Gender"), "got: {}", message);
}

#[test]
fn test_non_numeric_measure_is_fatal() {
    let content = format!(
        "{}\nPublic,Male,College,High,Low,Positive,Near,five,80,7,70,72,1\n",
        HEADER
    );
    let (_temp_dir, csv_path) = create_temp_csv_text(&content);

    let err = load_dataset(&csv_path, 100).unwrap_err();
    assert!(format!("{:#}", err).contains("Hours_Studied"));
}

#[test]
fn test_missing_file() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("nope.csv");

    let err = load_dataset(&path, 100).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_unsupported_extension() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("students.parquet");
    std::fs::write(&path, "not really parquet").unwrap();

    let err = load_dataset(&path, 100).unwrap_err();
    assert!(err.to_string().contains("Unsupported file format"));
}
