//! Izmir housing price pipeline: data preparation, gradient-boosted price
//! regression, and a synchronous prediction service with luxury-tier
//! scoring.

/// Persisted model and lookup-table artifacts.
pub mod artifacts;
/// Startup configuration.
pub mod config;
/// Listing records, CSV ingestion, and row cleaning.
pub mod data;
/// Categorical encoders fitted at training time.
pub mod encode;
/// Error types shared across the pipeline.
pub mod error;
/// Feature vector assembly.
pub mod features;
/// Logging setup.
pub mod logging;
/// Luxury score heuristic.
pub mod luxury;
/// Gradient-boosted stump regression.
pub mod model;
/// Prediction service.
pub mod predict;
/// Prediction-request validation.
pub mod validate;
