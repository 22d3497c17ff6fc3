//! Prediction-request validation.

use crate::config::ValidationLimits;
use crate::data::PropertyInput;
use crate::error::PipelineError;

/// Check every field of a request against the configured limits.
///
/// All violations are collected into one `DataValidation` error so the form
/// can show the full list at once.
pub fn validate_input(
    input: &PropertyInput,
    limits: &ValidationLimits,
) -> Result<(), PipelineError> {
    let mut errors = Vec::new();

    if input.district.trim().is_empty() {
        errors.push("district must not be empty".to_string());
    }
    if input.property_type.trim().is_empty() {
        errors.push("property type must not be empty".to_string());
    }
    if !input.area_m2.is_finite()
        || input.area_m2 < limits.area_min
        || input.area_m2 > limits.area_max
    {
        errors.push(format!(
            "area must be between {} and {} m2",
            limits.area_min, limits.area_max
        ));
    }
    if input.room_count < limits.room_min || input.room_count > limits.room_max {
        errors.push(format!(
            "room count must be between {} and {}",
            limits.room_min, limits.room_max
        ));
    }
    if input.living_room_count < limits.living_room_min
        || input.living_room_count > limits.living_room_max
    {
        errors.push(format!(
            "living room count must be between {} and {}",
            limits.living_room_min, limits.living_room_max
        ));
    }
    if input.building_age < limits.age_min || input.building_age > limits.age_max {
        errors.push(format!(
            "building age must be between {} and {} years",
            limits.age_min, limits.age_max
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        let message = errors.join("; ");
        tracing::warn!("Rejected prediction input: {message}");
        Err(PipelineError::DataValidation(message))
    }
}
