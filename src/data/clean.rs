//! Row cleaning: drop malformed and out-of-range listings.

use serde::Serialize;

use crate::config::CleaningProfile;
use crate::data::{PropertyRecord, RawRecord, normalize_category};

/// Counts reported after a cleaning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutlierStats {
    pub total_rows: usize,
    pub dropped_rows: usize,
    pub kept_rows: usize,
}

/// Keep rows that satisfy the data-model invariants and the configured
/// plausible ranges. The input is not mutated; dropped-row counts are logged
/// and returned.
pub fn clean_records(
    raw: &[RawRecord],
    profile: &CleaningProfile,
) -> (Vec<PropertyRecord>, OutlierStats) {
    let mut kept = Vec::with_capacity(raw.len());
    for row in raw {
        if let Some(record) = accept(row, profile) {
            kept.push(record);
        }
    }
    let stats = OutlierStats {
        total_rows: raw.len(),
        dropped_rows: raw.len() - kept.len(),
        kept_rows: kept.len(),
    };
    tracing::info!(
        "Cleaning done: kept {} of {} rows ({} dropped)",
        stats.kept_rows,
        stats.total_rows,
        stats.dropped_rows
    );
    (kept, stats)
}

fn accept(row: &RawRecord, profile: &CleaningProfile) -> Option<PropertyRecord> {
    let district = normalize_category(row.district.as_deref()?);
    let property_type = normalize_category(row.property_type.as_deref()?);
    if district.is_empty() || property_type.is_empty() {
        return None;
    }
    let area_m2 = row.area_m2?;
    let price = row.price?;
    if !area_m2.is_finite() || !price.is_finite() {
        return None;
    }
    if area_m2 < profile.area_min || area_m2 > profile.area_max {
        return None;
    }
    if price < profile.price_min || price > profile.price_max {
        return None;
    }
    Some(PropertyRecord {
        district,
        property_type,
        area_m2,
        room_count: row.room_count?,
        living_room_count: row.living_room_count?,
        building_age: row.building_age?,
        price,
    })
}
