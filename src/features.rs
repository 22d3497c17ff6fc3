//! Feature vector assembly shared by training and prediction.
//!
//! The column order is fixed here and nowhere else; the trained model
//! persists the resulting schema and prediction-time assembly must match it
//! exactly.

use crate::config::LuxuryConfig;
use crate::data::{PropertyInput, PropertyRecord};
use crate::encode::{DistrictScores, PropertyTypes};
use crate::error::PipelineError;
use crate::luxury::{LuxuryScore, luxury_score};

/// Encodes one property into the model's feature vector.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    pub districts: DistrictScores,
    pub property_types: PropertyTypes,
    pub luxury: LuxuryConfig,
}

impl FeatureEncoder {
    pub fn new(
        districts: DistrictScores,
        property_types: PropertyTypes,
        luxury: LuxuryConfig,
    ) -> Self {
        Self {
            districts,
            property_types,
            luxury,
        }
    }

    /// Ordered column names: numeric block, then one one-hot column per
    /// property type.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = vec![
            "area_m2".to_string(),
            "building_age".to_string(),
            "room_count".to_string(),
            "living_room_count".to_string(),
            "total_rooms".to_string(),
            "district_score".to_string(),
            "luxury_score".to_string(),
        ];
        for property_type in self.property_types.types() {
            names.push(format!("type_{property_type}"));
        }
        names
    }

    /// Encode a prediction-time input, also returning its luxury score.
    ///
    /// `fallback_district_score` is the configured policy for unseen
    /// districts; `None` rejects them with `UnknownCategory`.
    pub fn encode(
        &self,
        input: &PropertyInput,
        fallback_district_score: Option<f64>,
    ) -> Result<(Vec<f64>, LuxuryScore), PipelineError> {
        let district_score = self
            .districts
            .lookup(&input.district, fallback_district_score)?;
        let type_index = self.property_types.index_of(&input.property_type)?;

        let luxury = luxury_score(
            &self.luxury,
            self.districts.normalized(district_score),
            input.building_age,
            input.room_count,
            input.living_room_count,
            input.area_m2,
        );

        let mut features = vec![
            input.area_m2,
            f64::from(input.building_age),
            f64::from(input.room_count),
            f64::from(input.living_room_count),
            f64::from(input.room_count + input.living_room_count),
            district_score,
            luxury.value,
        ];
        let mut onehot = vec![0.0; self.property_types.len()];
        onehot[type_index] = 1.0;
        features.extend(onehot);
        Ok((features, luxury))
    }

    /// Encode a cleaned training row; identical to the prediction path.
    pub fn encode_record(
        &self,
        record: &PropertyRecord,
    ) -> Result<(Vec<f64>, LuxuryScore), PipelineError> {
        self.encode(&record_input(record), None)
    }
}

fn record_input(record: &PropertyRecord) -> PropertyInput {
    PropertyInput {
        district: record.district.clone(),
        property_type: record.property_type.clone(),
        area_m2: record.area_m2,
        room_count: record.room_count,
        living_room_count: record.living_room_count,
        building_age: record.building_age,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(district: &str, property_type: &str) -> PropertyRecord {
        PropertyRecord {
            district: district.to_string(),
            property_type: property_type.to_string(),
            area_m2: 120.0,
            room_count: 3,
            living_room_count: 1,
            building_age: 5,
            price: 4_800_000.0,
        }
    }

    fn encoder() -> FeatureEncoder {
        let records = vec![
            record("Bornova", "Daire"),
            record("Urla", "Villa"),
            record("Urla", "Daire"),
        ];
        FeatureEncoder::new(
            DistrictScores::fit(&records),
            PropertyTypes::fit(&records),
            LuxuryConfig::default(),
        )
    }

    #[test]
    fn feature_names_lock_the_column_order() {
        let names = encoder().feature_names();
        assert_eq!(
            names,
            vec![
                "area_m2",
                "building_age",
                "room_count",
                "living_room_count",
                "total_rooms",
                "district_score",
                "luxury_score",
                "type_Daire",
                "type_Villa",
            ]
        );
    }

    #[test]
    fn training_and_prediction_encodings_round_trip() {
        let encoder = encoder();
        let row = record("Urla", "Villa");
        let (train_vec, train_luxury) = encoder.encode_record(&row).unwrap();
        let (predict_vec, predict_luxury) = encoder
            .encode(
                &PropertyInput {
                    district: "Urla".to_string(),
                    property_type: "Villa".to_string(),
                    area_m2: 120.0,
                    room_count: 3,
                    living_room_count: 1,
                    building_age: 5,
                },
                None,
            )
            .unwrap();
        assert_eq!(train_vec, predict_vec);
        assert_eq!(train_luxury.value.to_bits(), predict_luxury.value.to_bits());
        assert_eq!(train_luxury.tier, predict_luxury.tier);
    }

    #[test]
    fn one_hot_marks_exactly_one_type_column() {
        let encoder = encoder();
        let (features, _) = encoder.encode_record(&record("Urla", "Villa")).unwrap();
        assert_eq!(features.len(), encoder.feature_names().len());
        // type_Daire then type_Villa.
        assert_eq!(&features[7..], &[0.0, 1.0]);
    }

    #[test]
    fn unknown_district_propagates_unknown_category() {
        let encoder = encoder();
        let mut row = record("Atlantis", "Villa");
        row.district = "Atlantis".to_string();
        assert!(matches!(
            encoder.encode_record(&row).unwrap_err(),
            PipelineError::UnknownCategory { .. }
        ));
    }
}
