//! Categorical encoders fitted once during training.
//!
//! Both tables are immutable value objects: computed from the cleaned
//! training set, persisted as artifacts, and passed explicitly into the
//! prediction path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::PropertyRecord;
use crate::error::PipelineError;

/// Target-encoded prestige score per district.
///
/// The score is the median price per square meter observed for the district
/// in the training data. The global median over all rows doubles as the
/// normalization base for the luxury formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictScores {
    scores: BTreeMap<String, f64>,
    global_median: f64,
}

impl DistrictScores {
    /// Compute per-district medians from a cleaned training set.
    pub fn fit(records: &[PropertyRecord]) -> Self {
        let mut by_district: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        let mut all = Vec::with_capacity(records.len());
        for record in records {
            let unit = record.unit_price();
            by_district
                .entry(record.district.as_str())
                .or_default()
                .push(unit);
            all.push(unit);
        }
        let scores = by_district
            .into_iter()
            .map(|(district, mut units)| (district.to_string(), median(&mut units)))
            .collect();
        Self {
            scores,
            global_median: median(&mut all),
        }
    }

    /// Score for a district seen at training time.
    ///
    /// `fallback` is the explicitly configured policy for unseen districts;
    /// without one the lookup fails with `UnknownCategory`.
    pub fn lookup(&self, district: &str, fallback: Option<f64>) -> Result<f64, PipelineError> {
        match self.scores.get(district) {
            Some(&score) => Ok(score),
            None => match fallback {
                Some(score) => {
                    tracing::warn!("Unknown district {district}; using configured fallback score");
                    Ok(score)
                }
                None => Err(PipelineError::unknown_district(district)),
            },
        }
    }

    /// District score divided by the global median, for unit-free weighting.
    pub fn normalized(&self, score: f64) -> f64 {
        if self.global_median > 0.0 {
            score / self.global_median
        } else {
            0.0
        }
    }

    pub fn global_median(&self) -> f64 {
        self.global_median
    }

    pub fn contains(&self, district: &str) -> bool {
        self.scores.contains_key(district)
    }

    pub fn districts(&self) -> impl Iterator<Item = &str> {
        self.scores.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Sorted distinct property types from the training set, with a stable
/// one-hot index per type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyTypes {
    types: Vec<String>,
}

impl PropertyTypes {
    pub fn fit(records: &[PropertyRecord]) -> Self {
        let mut set: std::collections::BTreeSet<&str> = std::collections::BTreeSet::new();
        for record in records {
            set.insert(record.property_type.as_str());
        }
        Self {
            types: set.into_iter().map(str::to_string).collect(),
        }
    }

    /// One-hot column index for a property type seen at training time.
    pub fn index_of(&self, property_type: &str) -> Result<usize, PipelineError> {
        self.types
            .iter()
            .position(|t| t == property_type)
            .ok_or_else(|| PipelineError::unknown_property_type(property_type))
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Median of an unsorted slice; 0 for an empty one.
fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(district: &str, property_type: &str, area: f64, price: f64) -> PropertyRecord {
        PropertyRecord {
            district: district.to_string(),
            property_type: property_type.to_string(),
            area_m2: area,
            room_count: 2,
            living_room_count: 1,
            building_age: 10,
            price,
        }
    }

    #[test]
    fn median_handles_odd_and_even_lengths() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(median(&mut []), 0.0);
    }

    #[test]
    fn fit_computes_median_unit_price_per_district() {
        let records = vec![
            record("Bornova", "Daire", 100.0, 2_000_000.0), // 20_000 / m2
            record("Bornova", "Daire", 100.0, 3_000_000.0), // 30_000 / m2
            record("Urla", "Villa", 200.0, 16_000_000.0),   // 80_000 / m2
        ];
        let scores = DistrictScores::fit(&records);
        assert_eq!(scores.lookup("Bornova", None).unwrap(), 25_000.0);
        assert_eq!(scores.lookup("Urla", None).unwrap(), 80_000.0);
        assert_eq!(scores.global_median(), 30_000.0);
    }

    #[test]
    fn unknown_district_fails_without_fallback() {
        let scores = DistrictScores::fit(&[record("Bornova", "Daire", 100.0, 2_000_000.0)]);
        let err = scores.lookup("Atlantis", None).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownCategory { .. }));
    }

    #[test]
    fn unknown_district_uses_configured_fallback() {
        let scores = DistrictScores::fit(&[record("Bornova", "Daire", 100.0, 2_000_000.0)]);
        assert_eq!(scores.lookup("Atlantis", Some(50_000.0)).unwrap(), 50_000.0);
    }

    #[test]
    fn property_types_sorted_with_stable_indices() {
        let records = vec![
            record("Bornova", "Villa", 100.0, 2_000_000.0),
            record("Bornova", "Daire", 100.0, 2_000_000.0),
            record("Urla", "Daire", 100.0, 2_000_000.0),
        ];
        let types = PropertyTypes::fit(&records);
        assert_eq!(types.types(), &["Daire".to_string(), "Villa".to_string()]);
        assert_eq!(types.index_of("Villa").unwrap(), 1);
        assert!(types.index_of("Castle").is_err());
    }
}
