//! Typed record schema for the student performance dataset
//!
//! Categorical fields carry a declared, ordered set of levels; a record stores
//! the position of its level (the ordinal code) rather than the raw string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::binning::{tutoring_group, Binning};
use super::error::PipelineError;

/// Categorical columns of the dataset, each with a fixed level set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CategoricalField {
    SchoolType,
    Gender,
    ParentalEducationLevel,
    TeacherQuality,
    MotivationLevel,
    PeerInfluence,
    DistanceFromHome,
}

impl CategoricalField {
    pub const COUNT: usize = 7;

    pub const ALL: [CategoricalField; Self::COUNT] = [
        CategoricalField::SchoolType,
        CategoricalField::Gender,
        CategoricalField::ParentalEducationLevel,
        CategoricalField::TeacherQuality,
        CategoricalField::MotivationLevel,
        CategoricalField::PeerInfluence,
        CategoricalField::DistanceFromHome,
    ];

    /// Column header in the source file
    pub fn column_name(self) -> &'static str {
        match self {
            CategoricalField::SchoolType => "School_Type",
            CategoricalField::Gender => "Gender",
            CategoricalField::ParentalEducationLevel => "Parental_Education_Level",
            CategoricalField::TeacherQuality => "Teacher_Quality",
            CategoricalField::MotivationLevel => "Motivation_Level",
            CategoricalField::PeerInfluence => "Peer_Influence",
            CategoricalField::DistanceFromHome => "Distance_from_Home",
        }
    }

    /// Declared levels in ordinal order
    pub fn levels(self) -> &'static [&'static str] {
        match self {
            CategoricalField::SchoolType => &["Public", "Private"],
            CategoricalField::Gender => &["Male", "Female"],
            CategoricalField::ParentalEducationLevel => &["High School", "College", "Postgraduate"],
            CategoricalField::TeacherQuality | CategoricalField::MotivationLevel => {
                &["Low", "Medium", "High"]
            }
            CategoricalField::PeerInfluence => &["Negative", "Neutral", "Positive"],
            CategoricalField::DistanceFromHome => &["Near", "Moderate", "Far"],
        }
    }

    /// Ordinal code of a level label, if the label belongs to this field
    pub fn code_of(self, label: &str) -> Option<u8> {
        self.levels()
            .iter()
            .position(|level| *level == label)
            .map(|pos| pos as u8)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for CategoricalField {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoricalField::ALL
            .into_iter()
            .find(|field| field.column_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PipelineError::UnknownDimension(s.to_string()))
    }
}

impl TryFrom<String> for CategoricalField {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CategoricalField> for String {
    fn from(field: CategoricalField) -> Self {
        field.column_name().to_string()
    }
}

/// Numeric columns of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NumericField {
    HoursStudied,
    Attendance,
    SleepHours,
    PreviousScores,
    ExamScore,
    TutoringSessions,
}

impl NumericField {
    pub const COUNT: usize = 6;

    pub const ALL: [NumericField; Self::COUNT] = [
        NumericField::HoursStudied,
        NumericField::Attendance,
        NumericField::SleepHours,
        NumericField::PreviousScores,
        NumericField::ExamScore,
        NumericField::TutoringSessions,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            NumericField::HoursStudied => "Hours_Studied",
            NumericField::Attendance => "Attendance",
            NumericField::SleepHours => "Sleep_Hours",
            NumericField::PreviousScores => "Previous_Scores",
            NumericField::ExamScore => "Exam_Score",
            NumericField::TutoringSessions => "Tutoring_Sessions",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for NumericField {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NumericField::ALL
            .into_iter()
            .find(|field| field.column_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PipelineError::UnknownDimension(s.to_string()))
    }
}

impl TryFrom<String> for NumericField {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NumericField> for String {
    fn from(field: NumericField) -> Self {
        field.column_name().to_string()
    }
}

/// One row of the dataset. Missing cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    levels: [Option<u8>; CategoricalField::COUNT],
    values: [Option<f64>; NumericField::COUNT],
}

impl Record {
    /// Ordinal code of the record's level for `field`
    pub fn code(&self, field: CategoricalField) -> Option<u8> {
        self.levels[field.index()]
    }

    /// Level label for `field`
    pub fn level(&self, field: CategoricalField) -> Option<&'static str> {
        self.code(field)
            .and_then(|code| field.levels().get(code as usize).copied())
    }

    pub fn value(&self, field: NumericField) -> Option<f64> {
        self.values[field.index()]
    }

    /// Set a categorical cell from its label, rejecting labels outside the domain
    pub fn set_level(&mut self, field: CategoricalField, label: &str) -> Result<(), PipelineError> {
        let code = field
            .code_of(label)
            .ok_or_else(|| PipelineError::UnknownCategory {
                field: field.column_name().to_string(),
                value: label.to_string(),
                expected: field.levels().to_vec(),
            })?;
        self.levels[field.index()] = Some(code);
        Ok(())
    }

    pub fn set_value(&mut self, field: NumericField, value: Option<f64>) {
        self.values[field.index()] = value.filter(|v| !v.is_nan());
    }

    pub fn with_level(mut self, field: CategoricalField, label: &str) -> Result<Self, PipelineError> {
        self.set_level(field, label)?;
        Ok(self)
    }

    pub fn with_value(mut self, field: NumericField, value: f64) -> Self {
        self.set_value(field, Some(value));
        self
    }
}

/// Immutable, ordered collection of records loaded once per session
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow every record as an unfiltered subset
    pub fn all(&self) -> Vec<&Record> {
        self.records.iter().collect()
    }
}

/// Anything a record can be grouped by: a categorical field or a derived column
#[derive(Debug, Clone, PartialEq)]
pub enum Dimension {
    Category(CategoricalField),
    /// Numeric column cut into labelled intervals
    Binned {
        name: String,
        source: NumericField,
        binning: Binning,
    },
    /// Tutoring sessions grouped as 0, 1, 2, 3, 4+ and Other
    TutoringGroup,
}

pub const SCORE_LEVEL: &str = "Score_Level";
pub const STUDY_HOURS_GROUP: &str = "Study_Hours_Group";
pub const TUTORING_GROUP: &str = "Tutoring_Group";

impl Dimension {
    /// Exam score cut at 0/50/75/100 into Low, Medium, High
    pub fn score_level() -> Self {
        Dimension::Binned {
            name: SCORE_LEVEL.to_string(),
            source: NumericField::ExamScore,
            binning: Binning::score_levels(),
        }
    }

    /// Hours studied cut at 0/2/5/8/12
    pub fn study_hours_group() -> Self {
        Dimension::Binned {
            name: STUDY_HOURS_GROUP.to_string(),
            source: NumericField::HoursStudied,
            binning: Binning::study_hours(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Dimension::Category(field) => field.column_name(),
            Dimension::Binned { name, .. } => name,
            Dimension::TutoringGroup => TUTORING_GROUP,
        }
    }

    /// Label of `record` along this dimension; `None` when missing or unassigned
    pub fn label<'s>(&'s self, record: &Record) -> Option<&'s str> {
        match self {
            Dimension::Category(field) => record.level(*field),
            Dimension::Binned {
                source, binning, ..
            } => record.value(*source).and_then(|v| binning.assign(v)),
            Dimension::TutoringGroup => Some(tutoring_group(
                record.value(NumericField::TutoringSessions),
            )),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<CategoricalField> for Dimension {
    fn from(field: CategoricalField) -> Self {
        Dimension::Category(field)
    }
}
