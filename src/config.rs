//! Pipeline configuration loaded once at startup.
//!
//! All tunables live here: file paths, cleaning bounds, input validation
//! limits, luxury-score weights and tier thresholds, and model
//! hyperparameters. Core modules consume these structs and never touch the
//! filesystem themselves.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Top-level configuration, deserialized from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub cleaning: CleaningConfig,
    #[serde(default)]
    pub validation: ValidationLimits,
    #[serde(default)]
    pub luxury: LuxuryConfig,
    #[serde(default)]
    pub model: ModelConfig,
    /// District score used when the requested district was not seen during
    /// training. Unknown districts are rejected unless this is set.
    #[serde(default)]
    pub fallback_district_score: Option<f64>,
}

/// File locations used by the training and prediction binaries.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Raw listings CSV.
    pub raw_csv: PathBuf,
    /// Directory holding the persisted model and lookup artifacts.
    pub artifact_dir: PathBuf,
    /// Directory for per-launch log files.
    pub log_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_csv: PathBuf::from("data/izmir_listings.csv"),
            artifact_dir: PathBuf::from("artifacts"),
            log_dir: PathBuf::from("logs"),
        }
    }
}

/// Row filters applied before a table is used.
///
/// Training uses tighter bounds than serving-side exploration, mirroring the
/// two profiles the scraped dataset needs.
#[derive(Debug, Clone, Deserialize)]
pub struct CleaningConfig {
    #[serde(default = "CleaningProfile::training")]
    pub training: CleaningProfile,
    #[serde(default = "CleaningProfile::serving")]
    pub serving: CleaningProfile,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            training: CleaningProfile::training(),
            serving: CleaningProfile::serving(),
        }
    }
}

/// Plausible-range bounds for one cleaning pass.
#[derive(Debug, Clone, Deserialize)]
pub struct CleaningProfile {
    pub price_min: f64,
    pub price_max: f64,
    pub area_min: f64,
    pub area_max: f64,
}

impl CleaningProfile {
    pub fn training() -> Self {
        Self {
            price_min: 300_000.0,
            price_max: 35_000_000.0,
            area_min: 40.0,
            area_max: 450.0,
        }
    }

    pub fn serving() -> Self {
        Self {
            price_min: 100_000.0,
            price_max: 50_000_000.0,
            area_min: 20.0,
            area_max: 1_000.0,
        }
    }
}

/// Accepted ranges for a single prediction request.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationLimits {
    pub area_min: f64,
    pub area_max: f64,
    pub room_min: u32,
    pub room_max: u32,
    pub living_room_min: u32,
    pub living_room_max: u32,
    pub age_min: u32,
    pub age_max: u32,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            area_min: 20.0,
            area_max: 1_000.0,
            room_min: 1,
            room_max: 10,
            living_room_min: 1,
            living_room_max: 5,
            age_min: 0,
            age_max: 100,
        }
    }
}

/// Weights and tier thresholds for the luxury score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LuxuryConfig {
    /// Weight of the normalized district prestige term.
    pub district_weight: f64,
    /// Weight of the building-age term.
    pub age_weight: f64,
    /// Decay rate per year of building age.
    pub age_decay: f64,
    /// Weight of the room-to-area term.
    pub room_weight: f64,
    /// Scale applied to the raw rooms-per-square-meter ratio.
    pub room_area_scale: f64,
    /// Ascending tier boundaries: [comfort, premium, ultra_luxury].
    pub tier_thresholds: [f64; 3],
}

impl Default for LuxuryConfig {
    fn default() -> Self {
        Self {
            district_weight: 35.0,
            age_weight: 25.0,
            age_decay: 0.15,
            room_weight: 20.0,
            room_area_scale: 30.0,
            tier_thresholds: [45.0, 65.0, 85.0],
        }
    }
}

impl LuxuryConfig {
    /// Tier boundaries must be strictly increasing.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let [a, b, c] = self.tier_thresholds;
        if a < b && b < c {
            Ok(())
        } else {
            Err(PipelineError::Config(format!(
                "tier thresholds must be strictly ascending, got [{a}, {b}, {c}]"
            )))
        }
    }
}

/// Training hyperparameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Number of boosting rounds.
    pub rounds: usize,
    /// Learning rate applied per round.
    pub learning_rate: f64,
    /// Number of bins used for split search.
    pub bins: usize,
    /// Held-out fraction for evaluation.
    pub test_ratio: f64,
    /// Seed for the train/test shuffle.
    pub seed: u64,
    /// Smallest cleaned table the trainer accepts.
    pub min_rows: usize,
    /// Fit on `ln(1 + price)` and invert at prediction time.
    pub log_target: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            rounds: 500,
            learning_rate: 0.05,
            bins: 64,
            test_ratio: 0.2,
            seed: 42,
            min_rows: 50,
            log_target: true,
        }
    }
}

impl PipelineConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&text)
            .map_err(|err| PipelineError::Config(format!("{}: {err}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        self.luxury.validate()?;
        if !(0.0..1.0).contains(&self.model.test_ratio) {
            return Err(PipelineError::Config(format!(
                "test_ratio must be in [0, 1), got {}",
                self.model.test_ratio
            )));
        }
        if self.model.rounds == 0 {
            return Err(PipelineError::Config("rounds must be positive".to_string()));
        }
        Ok(())
    }
}
