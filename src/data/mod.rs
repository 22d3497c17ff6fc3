//! Listing records and CSV ingestion.

pub mod clean;

use std::path::Path;

use csv::ReaderBuilder;
use serde::Deserialize;

use crate::error::PipelineError;

/// One CSV row as scraped, before any validation.
///
/// Numeric columns are optional so a malformed cell drops the row during
/// cleaning instead of aborting the whole load.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub area_m2: Option<f64>,
    #[serde(default)]
    pub room_count: Option<u32>,
    #[serde(default)]
    pub living_room_count: Option<u32>,
    #[serde(default)]
    pub building_age: Option<u32>,
    #[serde(default)]
    pub price: Option<f64>,
}

/// A cleaned training row satisfying the data-model invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    pub district: String,
    pub property_type: String,
    pub area_m2: f64,
    pub room_count: u32,
    pub living_room_count: u32,
    pub building_age: u32,
    /// Observed sale price, the regression target.
    pub price: f64,
}

impl PropertyRecord {
    /// Rooms plus living rooms, the `total_rooms` model feature.
    pub fn total_rooms(&self) -> u32 {
        self.room_count + self.living_room_count
    }

    /// Price per square meter; area is positive by invariant.
    pub fn unit_price(&self) -> f64 {
        self.price / self.area_m2
    }
}

/// A property described at prediction time. No price.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInput {
    pub district: String,
    pub property_type: String,
    pub area_m2: f64,
    pub room_count: u32,
    pub living_room_count: u32,
    pub building_age: u32,
}

/// Load raw listing rows from a headered CSV file.
pub fn load_csv(path: &Path) -> Result<Vec<RawRecord>, PipelineError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let record: RawRecord = result?;
        rows.push(record);
    }
    tracing::info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Trim whitespace and title-case a scraped categorical value.
///
/// District and type columns arrive with inconsistent casing ("çeşme",
/// "ÇEŞME"); normalizing here keeps the lookup tables to one key per value.
pub fn normalize_category(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for word in raw.trim().split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            for ch in chars {
                out.extend(ch.to_lowercase());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn normalize_category_trims_and_title_cases() {
        assert_eq!(normalize_category("  karşıyaka "), "Karşıyaka");
        assert_eq!(normalize_category("URLA"), "Urla");
        assert_eq!(normalize_category("güzel  bahçe"), "Güzel Bahçe");
        assert_eq!(normalize_category(""), "");
    }

    #[test]
    fn load_csv_reads_headered_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "district,property_type,area_m2,room_count,living_room_count,building_age,price"
        )
        .unwrap();
        writeln!(file, "Bornova,Daire,95.0,2,1,12,2400000").unwrap();
        writeln!(file, "Urla,Villa,240.0,4,2,3,14500000").unwrap();
        drop(file);

        let rows = load_csv(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].district.as_deref(), Some("Bornova"));
        assert_eq!(rows[1].area_m2, Some(240.0));
    }

    #[test]
    fn load_csv_missing_file_errors() {
        assert!(load_csv(Path::new("/nonexistent/listings.csv")).is_err());
    }
}
