//! Prediction service: one synchronous call per request over read-only
//! state.

use serde::Serialize;

use crate::artifacts::TrainedArtifacts;
use crate::config::{LuxuryConfig, ValidationLimits};
use crate::data::{PropertyInput, normalize_category};
use crate::error::PipelineError;
use crate::features::FeatureEncoder;
use crate::luxury::LuxuryScore;
use crate::model::gbdt::GbdtModel;
use crate::validate::validate_input;

/// One price estimate with its luxury assessment.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    /// Estimated price in the training currency.
    pub price: f64,
    /// Luxury score, tier, and per-term breakdown.
    pub luxury: LuxuryScore,
    /// District prestige score used for the estimate.
    pub district_score: f64,
}

/// Immutable prediction state built from loaded artifacts.
#[derive(Debug, Clone)]
pub struct Predictor {
    model: GbdtModel,
    encoder: FeatureEncoder,
    limits: ValidationLimits,
    fallback_district_score: Option<f64>,
}

impl Predictor {
    /// Assemble a predictor, checking that the loaded model's schema matches
    /// the encoder's column order. A mismatch means the artifacts were
    /// produced by incompatible code and every estimate would be garbage.
    pub fn new(
        artifacts: TrainedArtifacts,
        luxury: LuxuryConfig,
        limits: ValidationLimits,
        fallback_district_score: Option<f64>,
    ) -> Result<Self, PipelineError> {
        let encoder = FeatureEncoder::new(
            artifacts.district_scores,
            artifacts.property_types,
            luxury,
        );
        if artifacts.model.feature_names != encoder.feature_names() {
            return Err(PipelineError::InvalidModel(format!(
                "model schema {:?} does not match encoder schema {:?}",
                artifacts.model.feature_names,
                encoder.feature_names()
            )));
        }
        Ok(Self {
            model: artifacts.model,
            encoder,
            limits,
            fallback_district_score,
        })
    }

    /// Estimate the price and luxury tier for one property.
    pub fn predict(&self, input: &PropertyInput) -> Result<Prediction, PipelineError> {
        let input = PropertyInput {
            district: normalize_category(&input.district),
            property_type: normalize_category(&input.property_type),
            ..input.clone()
        };
        validate_input(&input, &self.limits)?;
        let (features, luxury) = self
            .encoder
            .encode(&input, self.fallback_district_score)?;
        let price = self.model.predict(&features);
        tracing::info!(
            district = %input.district,
            area_m2 = input.area_m2,
            price = price,
            tier = %luxury.tier,
            "Prediction served"
        );
        let district_score = features[5];
        Ok(Prediction {
            price,
            luxury,
            district_score,
        })
    }

    pub fn districts(&self) -> impl Iterator<Item = &str> {
        self.encoder.districts.districts()
    }

    pub fn property_types(&self) -> &[String] {
        self.encoder.property_types.types()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PropertyRecord;
    use crate::encode::{DistrictScores, PropertyTypes};
    use crate::features::FeatureEncoder;
    use crate::model::metrics::RegressionMetrics;
    use crate::model::train::{TrainOptions, TrainSet, train_gbdt};

    fn record(district: &str, property_type: &str, area: f64, price: f64) -> PropertyRecord {
        PropertyRecord {
            district: district.to_string(),
            property_type: property_type.to_string(),
            area_m2: area,
            room_count: 3,
            living_room_count: 1,
            building_age: 10,
            price,
        }
    }

    fn trained() -> TrainedArtifacts {
        let mut records = Vec::new();
        for i in 0..30 {
            let area = 80.0 + (i % 10) as f64 * 20.0;
            records.push(record("Bornova", "Daire", area, 25_000.0 * area));
            records.push(record("Urla", "Villa", area, 70_000.0 * area));
        }
        let districts = DistrictScores::fit(&records);
        let types = PropertyTypes::fit(&records);
        let encoder = FeatureEncoder::new(
            districts.clone(),
            types.clone(),
            LuxuryConfig::default(),
        );
        let mut x = Vec::new();
        let mut y = Vec::new();
        for row in &records {
            let (features, _) = encoder.encode_record(row).unwrap();
            x.push(features);
            y.push(row.price);
        }
        let dataset = TrainSet {
            feature_names: encoder.feature_names(),
            x,
            y,
        };
        let options = TrainOptions {
            rounds: 200,
            learning_rate: 0.1,
            bins: 32,
            min_rows: 10,
            log_target: true,
        };
        let (model, importance) = train_gbdt(&dataset, &options).unwrap();
        TrainedArtifacts {
            model,
            district_scores: districts,
            property_types: types,
            metrics: RegressionMetrics {
                r2: 0.0,
                mae: 0.0,
                rmse: 0.0,
                n_test: 0,
            },
            importance,
        }
    }

    fn input(district: &str) -> PropertyInput {
        PropertyInput {
            district: district.to_string(),
            property_type: "Daire".to_string(),
            area_m2: 120.0,
            room_count: 3,
            living_room_count: 1,
            building_age: 10,
        }
    }

    fn predictor(fallback: Option<f64>) -> Predictor {
        Predictor::new(
            trained(),
            LuxuryConfig::default(),
            ValidationLimits::default(),
            fallback,
        )
        .unwrap()
    }

    #[test]
    fn predicts_plausible_price_for_known_district() {
        let predictor = predictor(None);
        let prediction = predictor.predict(&input("Bornova")).unwrap();
        // Bornova trains at 25k/m2; a 120 m2 flat should land in the
        // low millions, far below Urla villas.
        assert!(prediction.price > 1_000_000.0, "price {}", prediction.price);
        assert!(prediction.price < 10_000_000.0, "price {}", prediction.price);
    }

    #[test]
    fn unknown_district_is_rejected_without_fallback() {
        let predictor = predictor(None);
        let err = predictor.predict(&input("Atlantis")).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownCategory { .. }));
    }

    #[test]
    fn unknown_district_with_fallback_predicts() {
        let predictor = predictor(Some(30_000.0));
        let prediction = predictor.predict(&input("Atlantis")).unwrap();
        assert_eq!(prediction.district_score, 30_000.0);
        assert!(prediction.price > 0.0);
    }

    #[test]
    fn invalid_numeric_field_is_rejected_before_lookup() {
        let predictor = predictor(None);
        let mut bad = input("Bornova");
        bad.area_m2 = -10.0;
        let err = predictor.predict(&bad).unwrap_err();
        assert!(matches!(err, PipelineError::DataValidation(_)));
    }

    #[test]
    fn request_casing_is_normalized() {
        let predictor = predictor(None);
        let prediction = predictor.predict(&input("  bornova ")).unwrap();
        assert!(prediction.price > 0.0);
    }

    #[test]
    fn repeated_requests_are_identical() {
        let predictor = predictor(None);
        let a = predictor.predict(&input("Urla")).unwrap();
        let b = predictor.predict(&input("Urla")).unwrap();
        assert_eq!(a.price.to_bits(), b.price.to_bits());
        assert_eq!(a.luxury.tier, b.luxury.tier);
    }

    #[test]
    fn schema_mismatch_is_rejected_at_construction() {
        let mut artifacts = trained();
        artifacts.model.feature_names.swap(0, 1);
        let err = Predictor::new(
            artifacts,
            LuxuryConfig::default(),
            ValidationLimits::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidModel(_)));
    }
}
