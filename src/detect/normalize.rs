//! Detection normalization.
//!
//! Reduces a raw prediction batch to the person detections above a confidence
//! threshold. The whole batch is validated: one malformed record rejects it.

use crate::detect::result::{NormalizedDetectionSet, RawPrediction, PERSON_CLASS};
use crate::error::NormalizeError;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Keep predictions labelled `person` whose confidence is strictly above the threshold.
pub fn normalize_predictions(
    predictions: &[RawPrediction],
    confidence_threshold: f64,
) -> Result<NormalizedDetectionSet, NormalizeError> {
    if !(0.0..=1.0).contains(&confidence_threshold) {
        return Err(NormalizeError::InvalidThreshold(confidence_threshold));
    }

    let mut retained = Vec::new();
    for (index, prediction) in predictions.iter().enumerate() {
        let detection = prediction.validate(index)?;
        if detection.class == PERSON_CLASS && detection.confidence > confidence_threshold {
            retained.push(detection);
        }
    }

    Ok(NormalizedDetectionSet::from_detections(retained))
}
