//! Shared test utilities and fixture generators
#![allow(dead_code)]

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

use scorelens::pipeline::{CategoricalField, Dataset, NumericField, Record};

/// Create a small student performance DataFrame with known characteristics
///
/// Eight students:
/// - School_Type: 5 Public, 3 Private
/// - Gender: alternating Male/Female
/// - Parental_Education_Level: one missing cell (last row)
/// - Exam_Score [45, 60, 80, 95, 55, 88, 70, 50] -> Low 2, Medium 3, High 3
/// - Hours_Studied [1, 3, 6, 10, 4, 9, 7, 2] -> 0-2 x2, 2-5 x2, 5-8 x2, 8-12 x2
pub fn create_student_dataframe() -> DataFrame {
    df! {
        "School_Type" => ["Public", "Public", "Private", "Private", "Public", "Public", "Private", "Public"],
        "Gender" => ["Male", "Female", "Male", "Female", "Male", "Female", "Male", "Female"],
        "Parental_Education_Level" => [
            Some("College"), Some("High School"), Some("Postgraduate"), Some("College"),
            Some("High School"), Some("Postgraduate"), Some("College"), None,
        ],
        "Teacher_Quality" => ["High", "Medium", "Medium", "High", "Low", "High", "Medium", "Medium"],
        "Motivation_Level" => ["Low", "Medium", "Medium", "High", "Low", "High", "Medium", "Low"],
        "Peer_Influence" => ["Positive", "Negative", "Neutral", "Positive", "Neutral", "Positive", "Negative", "Neutral"],
        "Distance_from_Home" => ["Near", "Moderate", "Near", "Far", "Moderate", "Near", "Far", "Near"],
        "Hours_Studied" => [1i64, 3, 6, 10, 4, 9, 7, 2],
        "Attendance" => [84i64, 64, 98, 92, 70, 95, 80, 60],
        "Sleep_Hours" => [7i64, 8, 7, 6, 9, 7, 8, 6],
        "Previous_Scores" => [73i64, 59, 91, 65, 68, 88, 75, 50],
        "Exam_Score" => [45i64, 60, 80, 95, 55, 88, 70, 50],
        "Tutoring_Sessions" => [0i64, 2, 1, 4, 3, 5, 0, 1],
    }
    .unwrap()
}

/// Create a larger random student DataFrame for stress tests
pub fn create_large_student_dataframe(rows: usize) -> DataFrame {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    let mut rng = StdRng::seed_from_u64(42);

    let mut columns: Vec<Column> = Vec::with_capacity(13);
    for field in CategoricalField::ALL {
        let levels = field.levels();
        let values: Vec<&str> = (0..rows)
            .map(|_| levels[rng.gen_range(0..levels.len())])
            .collect();
        columns.push(Column::new(field.column_name().into(), values));
    }
    for field in NumericField::ALL {
        let values: Vec<f64> = (0..rows)
            .map(|_| match field {
                NumericField::HoursStudied => rng.gen_range(1..=12) as f64,
                NumericField::Attendance => rng.gen_range(60..=100) as f64,
                NumericField::SleepHours => rng.gen_range(4..=10) as f64,
                NumericField::PreviousScores => rng.gen_range(50..=100) as f64,
                NumericField::ExamScore => rng.gen_range(40..=100) as f64,
                NumericField::TutoringSessions => rng.gen_range(0..=6) as f64,
            })
            .collect();
        columns.push(Column::new(field.column_name().into(), values));
    }

    DataFrame::new(columns).unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("students.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Write raw CSV text into a temporary file
pub fn create_temp_csv_text(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("students.csv");
    std::fs::write(&csv_path, content).unwrap();
    (temp_dir, csv_path)
}

/// The student fixture as a typed dataset
pub fn student_dataset() -> Dataset {
    scorelens::pipeline::dataset_from_frame(&create_student_dataframe()).unwrap()
}

/// Record with only the given numeric values set
pub fn numeric_record(values: &[(NumericField, f64)]) -> Record {
    values
        .iter()
        .fold(Record::default(), |r, &(field, v)| r.with_value(field, v))
}

/// Record with the given levels and numeric values set
pub fn student_record(levels: &[(CategoricalField, &str)], values: &[(NumericField, f64)]) -> Record {
    levels.iter().fold(numeric_record(values), |r, &(field, label)| {
        r.with_level(field, label).unwrap()
    })
}

/// Assert two floats are equal within `eps`
pub fn assert_close(actual: f64, expected: f64, eps: f64) {
    assert!(
        (actual - expected).abs() < eps,
        "expected {} within {} of {}",
        actual,
        eps,
        expected
    );
}
