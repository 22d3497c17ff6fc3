//! Persistence of the trained model and its lookup artifacts.
//!
//! One JSON file per artifact inside a directory. A missing file at load
//! time is fatal for that request and reported as `ArtifactNotFound`; the
//! caller should retrain rather than retry.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::encode::{DistrictScores, PropertyTypes};
use crate::error::PipelineError;
use crate::model::gbdt::GbdtModel;
use crate::model::metrics::RegressionMetrics;
use crate::model::train::FeatureImportance;

pub const MODEL_FILE: &str = "model.json";
pub const DISTRICT_SCORES_FILE: &str = "district_scores.json";
pub const PROPERTY_TYPES_FILE: &str = "property_types.json";
pub const METRICS_FILE: &str = "metrics.json";
pub const IMPORTANCE_FILE: &str = "importance.json";

/// Everything training persists and prediction loads back.
#[derive(Debug, Clone)]
pub struct TrainedArtifacts {
    pub model: GbdtModel,
    pub district_scores: DistrictScores,
    pub property_types: PropertyTypes,
    pub metrics: RegressionMetrics,
    pub importance: Vec<FeatureImportance>,
}

/// Write all artifacts into `dir`, creating it if needed.
pub fn save_artifacts(dir: &Path, artifacts: &TrainedArtifacts) -> Result<(), PipelineError> {
    std::fs::create_dir_all(dir)?;
    write_json(&dir.join(MODEL_FILE), &artifacts.model)?;
    write_json(&dir.join(DISTRICT_SCORES_FILE), &artifacts.district_scores)?;
    write_json(&dir.join(PROPERTY_TYPES_FILE), &artifacts.property_types)?;
    write_json(&dir.join(METRICS_FILE), &artifacts.metrics)?;
    write_json(&dir.join(IMPORTANCE_FILE), &artifacts.importance)?;
    tracing::info!("Saved artifacts to {}", dir.display());
    Ok(())
}

/// Load all artifacts from `dir`, validating the model.
pub fn load_artifacts(dir: &Path) -> Result<TrainedArtifacts, PipelineError> {
    let model = GbdtModel::load_json(&dir.join(MODEL_FILE))?;
    let artifacts = TrainedArtifacts {
        model,
        district_scores: read_json(&dir.join(DISTRICT_SCORES_FILE))?,
        property_types: read_json(&dir.join(PROPERTY_TYPES_FILE))?,
        metrics: read_json(&dir.join(METRICS_FILE))?,
        importance: read_json(&dir.join(IMPORTANCE_FILE))?,
    };
    tracing::info!(
        "Loaded artifacts from {} ({} districts, {} property types)",
        dir.display(),
        artifacts.district_scores.len(),
        artifacts.property_types.len()
    );
    Ok(artifacts)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    if !path.is_file() {
        return Err(PipelineError::ArtifactNotFound(PathBuf::from(path)));
    }
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
