use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;

/// Class label the normalizer retains.
pub const PERSON_CLASS: &str = "person";

/// One record as emitted by the inference step, before validation.
///
/// Fields are optional so that a missing field is reported by the normalizer
/// with its batch index instead of failing deserialization of the whole batch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Confidence in 0..=1.
    #[serde(default, alias = "confidence", skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// `[x, y, width, height]` in pixels, origin top-left.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
}

impl RawPrediction {
    pub fn new(class: &str, score: f64, bbox: [f64; 4]) -> Self {
        Self {
            class: Some(class.to_string()),
            score: Some(score),
            bbox: Some(bbox.to_vec()),
        }
    }

    /// Check every field and convert into a `Detection`.
    pub fn validate(&self, index: usize) -> Result<Detection, NormalizeError> {
        let class = match self.class.as_deref() {
            Some(class) if !class.trim().is_empty() => class.to_string(),
            Some(_) => return Err(NormalizeError::invalid(index, "empty class label")),
            None => return Err(NormalizeError::invalid(index, "missing class")),
        };

        let confidence = self
            .score
            .ok_or_else(|| NormalizeError::invalid(index, "missing confidence"))?;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(NormalizeError::invalid(
                index,
                format!("confidence {} outside 0..=1", confidence),
            ));
        }

        let raw_bbox = self
            .bbox
            .as_deref()
            .ok_or_else(|| NormalizeError::invalid(index, "missing bbox"))?;
        let bbox = BoundingBox::from_slice(raw_bbox)
            .map_err(|reason| NormalizeError::invalid(index, reason))?;

        Ok(Detection {
            class,
            confidence,
            bbox,
        })
    }
}

/// Pixel-space bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    fn from_slice(values: &[f64]) -> Result<Self, String> {
        let [x, y, width, height] = values else {
            return Err(format!("bbox must have 4 values, got {}", values.len()));
        };
        if values.iter().any(|v| !v.is_finite()) {
            return Err("bbox contains non-finite values".to_string());
        }
        if *x < 0.0 || *y < 0.0 {
            return Err(format!("bbox origin ({}, {}) is negative", x, y));
        }
        if *width <= 0.0 || *height <= 0.0 {
            return Err(format!("bbox size {}x{} is not positive", width, height));
        }
        Ok(Self {
            x: *x,
            y: *y,
            width: *width,
            height: *height,
        })
    }

    /// Raw pixel area.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// A validated model output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class: String,
    pub confidence: f64,
    pub bbox: BoundingBox,
}

/// Confidence-filtered person detections for one frame.
///
/// `person_count` is always `detections.len()`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NormalizedDetectionSet {
    detections: Vec<Detection>,
    person_count: usize,
    max_confidence: f64,
}

impl NormalizedDetectionSet {
    /// Build a set from detections that were already filtered, preserving order.
    pub fn from_detections(detections: Vec<Detection>) -> Self {
        let max_confidence = detections
            .iter()
            .map(|d| d.confidence)
            .fold(0.0f64, f64::max);
        Self {
            person_count: detections.len(),
            detections,
            max_confidence,
        }
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn person_count(&self) -> usize {
        self.person_count
    }

    /// Highest retained confidence, or 0 when nothing was retained.
    pub fn max_confidence(&self) -> f64 {
        self.max_confidence
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Sum of bounding-box areas. Overlapping boxes are counted twice.
    pub fn total_area(&self) -> f64 {
        self.detections.iter().map(|d| d.bbox.area()).sum()
    }
}
