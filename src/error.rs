//! Error types shared across the pipeline.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Categorical column a lookup failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    District,
    PropertyType,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKind::District => write!(f, "district"),
            CategoryKind::PropertyType => write!(f, "property type"),
        }
    }
}

/// Errors raised by training and prediction.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A request field violated its configured range or was missing.
    #[error("invalid input: {0}")]
    DataValidation(String),
    /// A categorical value was not present in the training set.
    #[error("unknown {kind}: {value}")]
    UnknownCategory { kind: CategoryKind, value: String },
    /// The cleaned table is too small to fit a model.
    #[error("not enough rows to train: {rows} (minimum {min_rows})")]
    InsufficientData { rows: usize, min_rows: usize },
    /// A persisted artifact is missing at prediction time.
    #[error("artifact not found: {} (retrain to regenerate it)", .0.display())]
    ArtifactNotFound(PathBuf),
    /// A loaded model failed its structural checks.
    #[error("invalid model artifact: {0}")]
    InvalidModel(String),
    /// A configuration value was rejected.
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl PipelineError {
    pub fn unknown_district(value: &str) -> Self {
        PipelineError::UnknownCategory {
            kind: CategoryKind::District,
            value: value.to_string(),
        }
    }

    pub fn unknown_property_type(value: &str) -> Self {
        PipelineError::UnknownCategory {
            kind: CategoryKind::PropertyType,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_names_kind_and_value() {
        let err = PipelineError::unknown_district("Atlantis");
        assert_eq!(err.to_string(), "unknown district: Atlantis");
        let err = PipelineError::unknown_property_type("Castle");
        assert_eq!(err.to_string(), "unknown property type: Castle");
    }

    #[test]
    fn insufficient_data_reports_counts() {
        let err = PipelineError::InsufficientData {
            rows: 3,
            min_rows: 50,
        };
        assert!(err.to_string().contains("3"));
        assert!(err.to_string().contains("50"));
    }
}
