//! Dashboard configuration: which derived tables are built, and how
//!
//! Defaults reproduce the standard dashboard. A JSON file may override any
//! subset of fields; missing fields keep their defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::aggregate::AggFn;
use super::binning::Binning;
use super::error::PipelineError;
use super::projection::Axis;
use super::schema::{
    CategoricalField, Dimension, NumericField, SCORE_LEVEL, STUDY_HOURS_GROUP, TUTORING_GROUP,
};

/// File name looked up under the user config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Edges and labels for Score_Level
    pub score_bins: Binning,
    /// Edges and labels for Study_Hours_Group
    pub study_hours_bins: Binning,
    /// Color/group dimension when the filter parameters name none
    pub default_color: String,
    pub box_value: NumericField,
    pub treemap_keys: Vec<String>,
    pub treemap_value: NumericField,
    pub treemap_agg: AggFn,
    pub parallel_axes: Vec<Axis>,
    pub scatter_x: NumericField,
    pub scatter_y: NumericField,
    pub correlation_columns: Vec<NumericField>,
    pub sankey_stages: Vec<String>,
    /// Second key of the split violin (the first is the color dimension)
    pub violin_split: String,
    pub violin_value: NumericField,
    pub pie_dimension: String,
    pub mosaic_x: String,
    pub mosaic_y: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            score_bins: Binning::score_levels(),
            study_hours_bins: Binning::study_hours(),
            default_color: "Gender".to_string(),
            box_value: NumericField::ExamScore,
            treemap_keys: vec![
                "School_Type".to_string(),
                "Parental_Education_Level".to_string(),
                "Gender".to_string(),
            ],
            treemap_value: NumericField::ExamScore,
            treemap_agg: AggFn::Mean,
            parallel_axes: vec![
                Axis::Numeric(NumericField::HoursStudied),
                Axis::Numeric(NumericField::Attendance),
                Axis::Numeric(NumericField::SleepHours),
                Axis::Numeric(NumericField::PreviousScores),
                Axis::Ordinal(CategoricalField::MotivationLevel),
                Axis::Numeric(NumericField::ExamScore),
            ],
            scatter_x: NumericField::HoursStudied,
            scatter_y: NumericField::ExamScore,
            correlation_columns: NumericField::ALL.to_vec(),
            sankey_stages: vec![
                STUDY_HOURS_GROUP.to_string(),
                "Motivation_Level".to_string(),
                SCORE_LEVEL.to_string(),
            ],
            violin_split: "Gender".to_string(),
            violin_value: NumericField::ExamScore,
            pie_dimension: SCORE_LEVEL.to_string(),
            mosaic_x: "School_Type".to_string(),
            mosaic_y: SCORE_LEVEL.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Resolve a dimension name against this configuration's binnings
    pub fn dimension(&self, name: &str) -> Result<Dimension, PipelineError> {
        let name = name.trim();
        if name.eq_ignore_ascii_case(SCORE_LEVEL) {
            return Ok(Dimension::Binned {
                name: SCORE_LEVEL.to_string(),
                source: NumericField::ExamScore,
                binning: self.score_bins.clone(),
            });
        }
        if name.eq_ignore_ascii_case(STUDY_HOURS_GROUP) {
            return Ok(Dimension::Binned {
                name: STUDY_HOURS_GROUP.to_string(),
                source: NumericField::HoursStudied,
                binning: self.study_hours_bins.clone(),
            });
        }
        if name.eq_ignore_ascii_case(TUTORING_GROUP) {
            return Ok(Dimension::TutoringGroup);
        }
        name.parse::<CategoricalField>().map(Dimension::Category)
    }

    pub fn dimensions(&self, names: &[String]) -> Result<Vec<Dimension>, PipelineError> {
        names.iter().map(|n| self.dimension(n)).collect()
    }

    /// Resolve every named dimension and check arity constraints up front
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.dimension(&self.default_color)?;
        self.dimension(&self.violin_split)?;
        self.dimension(&self.pie_dimension)?;
        self.dimension(&self.mosaic_x)?;
        self.dimension(&self.mosaic_y)?;
        if self.dimensions(&self.treemap_keys)?.is_empty() {
            return Err(PipelineError::NoGroupKeys);
        }
        let stages = self.dimensions(&self.sankey_stages)?;
        if stages.len() < 2 {
            return Err(PipelineError::TooFewStages(stages.len()));
        }
        if self.correlation_columns.len() < 2 {
            return Err(PipelineError::TooFewColumns(self.correlation_columns.len()));
        }
        Ok(())
    }

    /// Read a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// `<config dir>/scorelens/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scorelens").join(CONFIG_FILE_NAME))
    }

    /// Load `explicit` if given, else the default path if it exists, else defaults.
    /// Returns the path actually read, if any.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        match Self::default_path().filter(|p| p.is_file()) {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }
}
