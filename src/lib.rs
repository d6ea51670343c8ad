//! ScoreLens: Student Performance Dashboard Library
//!
//! Loads a student performance dataset, applies user filters and optional
//! outlier trimming, and derives the tables behind each dashboard chart.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
