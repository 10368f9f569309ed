//! Core computation for calorie-scale.
//!
//! This module contains:
//! - The cubic ease-in-out curve
//! - Intensity estimation from event gaps
//! - The shared cell holding the latest intensity

pub mod cell;
pub mod ease;
pub mod estimator;

// Re-export commonly used types
pub use cell::{create_shared_cell, IntensityCell, SharedIntensityCell};
pub use ease::ease_in_out_cubic;
pub use estimator::{Estimate, EstimateError, GapStats, Intensity, IntensityEstimator};
