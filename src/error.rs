//! Typed failures raised by the profile table, the dataset rewriter, and the
//! recommendation boundary.
//!
//! Command handlers wrap these in `anyhow::Error` with context; library
//! callers can match on them directly.

use std::path::PathBuf;

use thiserror::Error;

use crate::features::Feature;

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("Profile table contains a crop with an empty name")]
    EmptyName,
    #[error("Crop name '{0}' has leading or trailing whitespace")]
    UntrimmedName(String),
    #[error("Crop '{0}' is defined more than once")]
    DuplicateName(String),
    #[error("Crop '{crop}' has a non-finite {feature} bound")]
    NonFiniteBound { crop: String, feature: Feature },
    #[error("Crop '{crop}' has an inverted {feature} range [{min}, {max}]")]
    InvertedBounds {
        crop: String,
        feature: Feature,
        min: f64,
        max: f64,
    },
    #[error("Crop '{crop}' has a {feature} range too wide to sample [{min}, {max}]")]
    UnboundedRange {
        crop: String,
        feature: Feature,
        min: f64,
        max: f64,
    },
    #[error("Crop '{crop}' has a negative {feature} bound ({value})")]
    NegativeBound {
        crop: String,
        feature: Feature,
        value: f64,
    },
}

#[derive(Debug, Error)]
pub enum CorrectionError {
    #[error("Source dataset not found: {0:?}")]
    SourceNotFound(PathBuf),
    #[error("Output {0:?} would overwrite the source dataset")]
    OutputIsSource(PathBuf),
    #[error("Dataset has no '{column}' column")]
    MissingCropColumn { column: &'static str },
    #[error("Column '{0}' appears more than once in the header")]
    DuplicateColumn(String),
    #[error("Row {row} has {found} field(s) but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{} crop label(s) did not match any profile: {}", .labels.len(), .labels.join(", "))]
    UnresolvedLabels { labels: Vec<String> },
}

#[derive(Debug, Error, PartialEq)]
pub enum RecommendError {
    #[error("{feature} must be a finite number")]
    NonFinite { feature: Feature },
    #[error("{feature} = {value} is outside the accepted range [{min}, {max}]")]
    OutOfRange {
        feature: Feature,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("Classifier returned {probabilities} probabilities for {labels} label(s)")]
    LabelMismatch { labels: usize, probabilities: usize },
    #[error("Classifier has no labels")]
    NoLabels,
}
