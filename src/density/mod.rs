//! Crowd density classification and aggregation.

mod classify;
mod summary;

pub use classify::{classify_density, DensityClassification, DensityLevel, MAX_ALERT_LEVEL};
pub use summary::DensitySummary;
