//! Luxury score: a pure heuristic summarizing desirability.
//!
//! The score combines location prestige, building age, and spatial
//! efficiency. Identical inputs always produce identical output; the
//! training and prediction paths share this single implementation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::LuxuryConfig;

/// Tier bucket assigned from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LuxuryTier {
    Standard,
    Comfort,
    Premium,
    UltraLuxury,
}

impl fmt::Display for LuxuryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LuxuryTier::Standard => write!(f, "Standard"),
            LuxuryTier::Comfort => write!(f, "Comfort"),
            LuxuryTier::Premium => write!(f, "Premium"),
            LuxuryTier::UltraLuxury => write!(f, "Ultra Luxury"),
        }
    }
}

/// Per-term contributions, reported alongside the scalar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LuxuryBreakdown {
    pub district_term: f64,
    pub age_term: f64,
    pub spatial_term: f64,
}

/// Result of one luxury-score evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LuxuryScore {
    pub value: f64,
    pub tier: LuxuryTier,
    pub breakdown: LuxuryBreakdown,
}

/// Compute the luxury score for one property.
///
/// `district_score` is the normalized prestige value (district median unit
/// price over the global median). Higher prestige, lower age, and a higher
/// room-to-area ratio each raise the score according to the configured
/// weights.
pub fn luxury_score(
    config: &LuxuryConfig,
    district_score: f64,
    building_age: u32,
    room_count: u32,
    living_room_count: u32,
    area_m2: f64,
) -> LuxuryScore {
    let district_term = config.district_weight * district_score;
    let age_term = config.age_weight / (1.0 + config.age_decay * f64::from(building_age));
    let rooms = f64::from(room_count + living_room_count);
    let ratio = if area_m2 > 0.0 { rooms / area_m2 } else { 0.0 };
    let spatial_term = config.room_weight * ratio * config.room_area_scale;
    let value = district_term + age_term + spatial_term;
    LuxuryScore {
        value,
        tier: tier_for(config, value),
        breakdown: LuxuryBreakdown {
            district_term,
            age_term,
            spatial_term,
        },
    }
}

/// Map a numeric score onto the highest tier whose threshold it reaches.
pub fn tier_for(config: &LuxuryConfig, value: f64) -> LuxuryTier {
    let [comfort, premium, ultra] = config.tier_thresholds;
    if value >= ultra {
        LuxuryTier::UltraLuxury
    } else if value >= premium {
        LuxuryTier::Premium
    } else if value >= comfort {
        LuxuryTier::Comfort
    } else {
        LuxuryTier::Standard
    }
}
