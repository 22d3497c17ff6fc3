//! Serialized gradient-boosted stump regressor.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

pub const MODEL_VERSION: i64 = 1;

/// Single-node decision tree used as a weak learner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stump {
    /// Feature index used for the split.
    pub feature_index: u16,
    /// Threshold in feature units.
    pub threshold: f64,
    /// Prediction for `feature <= threshold`.
    pub left_value: f64,
    /// Prediction for `feature > threshold`.
    pub right_value: f64,
}

impl Stump {
    /// Predict the stump value for a feature vector.
    pub fn predict(&self, features: &[f64]) -> f64 {
        let idx = self.feature_index as usize;
        let value = features.get(idx).copied().unwrap_or(0.0);
        if value <= self.threshold {
            self.left_value
        } else {
            self.right_value
        }
    }
}

/// Gradient-boosted stump model predicting a price from a fixed feature
/// schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtModel {
    /// Model format version.
    pub model_version: i64,
    /// Ordered feature names the model was trained with. Prediction-time
    /// vectors must be assembled in exactly this order.
    pub feature_names: Vec<String>,
    /// Constant prediction before any boosting round.
    pub base_prediction: f64,
    /// Learning rate applied to each stump.
    pub learning_rate: f64,
    /// Fitted stumps in boosting order.
    pub stumps: Vec<Stump>,
    /// Whether the target was transformed to `ln(1 + price)` during
    /// training; predictions are inverted accordingly.
    pub log_target: bool,
}

impl GbdtModel {
    /// Validate structural invariants of the model.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.model_version != MODEL_VERSION {
            return Err(PipelineError::InvalidModel(format!(
                "unsupported model version {}",
                self.model_version
            )));
        }
        if self.feature_names.is_empty() {
            return Err(PipelineError::InvalidModel(
                "model has no feature schema".to_string(),
            ));
        }
        let n_features = self.feature_names.len();
        for (idx, stump) in self.stumps.iter().enumerate() {
            if stump.feature_index as usize >= n_features {
                return Err(PipelineError::InvalidModel(format!(
                    "stump {idx} splits on feature {} but the schema has {n_features}",
                    stump.feature_index
                )));
            }
        }
        Ok(())
    }

    /// Load a model from a JSON file, validating after deserialization.
    pub fn load_json(path: &Path) -> Result<Self, PipelineError> {
        if !path.is_file() {
            return Err(PipelineError::ArtifactNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let model: Self = serde_json::from_slice(&bytes)?;
        model.validate()?;
        Ok(model)
    }

    /// Prediction in the (possibly transformed) training target space.
    pub fn predict_raw(&self, features: &[f64]) -> f64 {
        let mut raw = self.base_prediction;
        for stump in &self.stumps {
            raw += self.learning_rate * stump.predict(features);
        }
        raw
    }

    /// Price prediction in the original target units.
    pub fn predict(&self, features: &[f64]) -> f64 {
        let raw = self.predict_raw(features);
        if self.log_target { raw.exp_m1() } else { raw }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature_index: u16, threshold: f64, left: f64, right: f64) -> Stump {
        Stump {
            feature_index,
            threshold,
            left_value: left,
            right_value: right,
        }
    }

    #[test]
    fn stump_predict_branches() {
        let s = stump(0, 0.5, -1.0, 2.0);
        assert_eq!(s.predict(&[0.0]), -1.0);
        assert_eq!(s.predict(&[0.5]), -1.0);
        assert_eq!(s.predict(&[0.6]), 2.0);
    }

    #[test]
    fn model_sums_base_and_scaled_stumps() {
        let model = GbdtModel {
            model_version: MODEL_VERSION,
            feature_names: vec!["area_m2".into()],
            base_prediction: 10.0,
            learning_rate: 0.5,
            stumps: vec![stump(0, 100.0, -2.0, 4.0)],
            log_target: false,
        };
        assert_eq!(model.predict(&[80.0]), 9.0);
        assert_eq!(model.predict(&[150.0]), 12.0);
    }

    #[test]
    fn log_target_prediction_is_inverted() {
        let model = GbdtModel {
            model_version: MODEL_VERSION,
            feature_names: vec!["area_m2".into()],
            base_prediction: (1_000_000.0f64).ln_1p(),
            learning_rate: 0.1,
            stumps: Vec::new(),
            log_target: true,
        };
        assert!((model.predict(&[80.0]) - 1_000_000.0).abs() < 1e-3);
    }

    #[test]
    fn validate_rejects_out_of_schema_split() {
        let model = GbdtModel {
            model_version: MODEL_VERSION,
            feature_names: vec!["area_m2".into()],
            base_prediction: 0.0,
            learning_rate: 0.1,
            stumps: vec![stump(3, 0.0, 0.0, 0.0)],
            log_target: false,
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn load_json_missing_file_is_artifact_not_found() {
        let err = GbdtModel::load_json(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactNotFound(_)));
    }
}
