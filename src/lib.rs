//! Crowd Sentinel
//!
//! Turns object-detection output for a camera frame into a crowd density
//! classification and an alert level.
//!
//! # Architecture
//!
//! The core is two pure, synchronous stages that hold no shared state and can
//! run concurrently from any number of threads:
//!
//! 1. **Normalize** (`detect::normalize_predictions`): validate a raw
//!    prediction batch and keep person detections strictly above the
//!    confidence threshold.
//! 2. **Classify** (`density::classify_density`): compare summed person box
//!    area against the frame area and band the result into low, medium, high
//!    or critical (alert levels 1..=4, 0 when nobody is present).
//!
//! Around the core sit injected collaborators: a `DetectorBackend` runs
//! inference, a `RecordSink` persists camera updates and alerts. The
//! `DensityMonitor` wires them together per frame and skips frames it cannot
//! classify instead of stopping.
//!
//! # Module Structure
//!
//! - `detect`: raw predictions, normalizer, backends and batch input parsing
//! - `density`: classifier and summary aggregation
//! - `frame`, `ingest`: frame values and a synthetic source
//! - `record`: camera/alert payloads and sinks
//! - `monitor`: the per-frame pipeline
//! - `config`: monitor configuration from file and environment

use anyhow::Result;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod config;
pub mod density;
pub mod detect;
pub mod error;
pub mod frame;
pub mod ingest;
pub mod monitor;
pub mod record;

pub use density::{classify_density, DensityClassification, DensityLevel, DensitySummary};
pub use detect::{
    normalize_predictions, parse_frame_batch, BoundingBox, Detection, DetectorBackend,
    FrameBatch, NormalizedDetectionSet, RawPrediction, ScriptedBackend, SharedBackend,
    DEFAULT_CONFIDENCE_THRESHOLD, PERSON_CLASS,
};
pub use error::{ClassifyError, NormalizeError, SentinelError};
pub use frame::Frame;
pub use ingest::{SyntheticConfig, SyntheticSource};
pub use monitor::{DensityMonitor, FrameOutcome, FrameReport, MonitorSettings, SkipReason};
pub use record::{
    AlertDraft, CameraDetectionUpdate, InMemoryRecordSink, JsonLinesSink, RecordSink,
};

/// Normalize a batch and classify it in one call.
pub fn analyze_frame(
    predictions: &[RawPrediction],
    confidence_threshold: f64,
    image_width: u32,
    image_height: u32,
) -> std::result::Result<(NormalizedDetectionSet, DensityClassification), SentinelError> {
    let set = normalize_predictions(predictions, confidence_threshold)?;
    let classification = classify_density(&set, image_width, image_height)?;
    Ok((set, classification))
}

pub(crate) fn now_s() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}
