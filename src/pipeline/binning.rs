//! Categorical binning of continuous values
//!
//! Intervals are right-closed (`e_i < v <= e_{i+1}`) except the first, which
//! also includes its lower edge so that a value equal to `e0` is assigned to
//! the first label instead of being dropped.

use serde::{Deserialize, Serialize};

use super::error::PipelineError;

/// Label for tutoring counts that are missing, negative or fractional
pub const TUTORING_OTHER: &str = "Other";

/// Label for tutoring counts of four or more
pub const TUTORING_MANY: &str = "4+";

const TUTORING_LABELS: [&str; 4] = ["0", "1", "2", "3"];

/// Validated edges and labels for cutting a numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBinning")]
pub struct Binning {
    edges: Vec<f64>,
    labels: Vec<String>,
}

#[derive(Deserialize)]
struct RawBinning {
    edges: Vec<f64>,
    labels: Vec<String>,
}

impl TryFrom<RawBinning> for Binning {
    type Error = PipelineError;

    fn try_from(raw: RawBinning) -> Result<Self, Self::Error> {
        Binning::new(raw.edges, raw.labels)
    }
}

impl Binning {
    /// Build a binning from strictly increasing, finite edges and one label per interval
    pub fn new(edges: Vec<f64>, labels: Vec<String>) -> Result<Self, PipelineError> {
        if edges.len() < 2 {
            return Err(PipelineError::InvalidBinning(format!(
                "need at least 2 edges, got {}",
                edges.len()
            )));
        }
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(PipelineError::InvalidBinning(
                "edges must be finite".to_string(),
            ));
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PipelineError::InvalidBinning(format!(
                "edges must be strictly increasing: {:?}",
                edges
            )));
        }
        if labels.len() != edges.len() - 1 {
            return Err(PipelineError::InvalidBinning(format!(
                "{} edges define {} intervals but {} labels were given",
                edges.len(),
                edges.len() - 1,
                labels.len()
            )));
        }
        Ok(Self { edges, labels })
    }

    /// Exam score levels: (0, 50] Low, (50, 75] Medium, (75, 100] High
    pub fn score_levels() -> Self {
        Self {
            edges: vec![0.0, 50.0, 75.0, 100.0],
            labels: vec!["Low".into(), "Medium".into(), "High".into()],
        }
    }

    /// Weekly study hours: 0-2, 2-5, 5-8, 8-12
    pub fn study_hours() -> Self {
        Self {
            edges: vec![0.0, 2.0, 5.0, 8.0, 12.0],
            labels: vec!["0-2".into(), "2-5".into(), "5-8".into(), "8-12".into()],
        }
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Label for `value`, or `None` outside `[e0, en]`
    pub fn assign(&self, value: f64) -> Option<&str> {
        bin_numeric(value, &self.edges, &self.labels)
    }
}

/// Assign `value` to the label of the interval containing it.
///
/// Expects `edges.len() == labels.len() + 1` with strictly increasing edges;
/// use [`Binning::new`] to validate caller-supplied edges.
pub fn bin_numeric<'a, L: AsRef<str>>(value: f64, edges: &[f64], labels: &'a [L]) -> Option<&'a str> {
    if value.is_nan() || edges.len() < 2 {
        return None;
    }

    let first = edges[0];
    let last = edges[edges.len() - 1];
    if value < first || value > last {
        return None;
    }
    if value == first {
        return labels.first().map(|l| l.as_ref());
    }

    // First edge >= value closes the interval that contains it
    let upper = edges.partition_point(|&e| e < value);
    labels.get(upper - 1).map(|l| l.as_ref())
}

/// Group a tutoring session count: 0-3 keep their own label, 4 and above
/// become "4+", anything that is not a non-negative integer is "Other".
pub fn tutoring_group(sessions: Option<f64>) -> &'static str {
    match sessions {
        Some(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => {
            if v >= 4.0 {
                TUTORING_MANY
            } else {
                TUTORING_LABELS[v as usize]
            }
        }
        _ => TUTORING_OTHER,
    }
}
