//! One frame's worth of recorded predictions, as the classify tool reads it.
//!
//! Accepted shapes: a bare array of predictions, or
//! `{ "width": .., "height": .., "predictions": [..] }`. Explicit dimensions
//! passed by the caller win over the ones in the document.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::detect::result::RawPrediction;

#[derive(Deserialize)]
#[serde(untagged)]
enum FrameInput {
    Framed {
        width: Option<u32>,
        height: Option<u32>,
        predictions: Vec<RawPrediction>,
    },
    Bare(Vec<RawPrediction>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameBatch {
    pub width: u32,
    pub height: u32,
    pub predictions: Vec<RawPrediction>,
}

pub fn parse_frame_batch(
    raw: &str,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<FrameBatch> {
    let (file_width, file_height, predictions) =
        match serde_json::from_str::<FrameInput>(raw).context("invalid prediction input")? {
            FrameInput::Framed {
                width,
                height,
                predictions,
            } => (width, height, predictions),
            FrameInput::Bare(predictions) => (None, None, predictions),
        };

    let width = width
        .or(file_width)
        .ok_or_else(|| anyhow!("frame width missing: pass --width or set \"width\""))?;
    let height = height
        .or(file_height)
        .ok_or_else(|| anyhow!("frame height missing: pass --height or set \"height\""))?;

    Ok(FrameBatch {
        width,
        height,
        predictions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE: &str = r#"[{"class": "person", "score": 0.9, "bbox": [0, 0, 10, 20]}]"#;

    #[test]
    fn bare_array_takes_dimensions_from_caller() {
        let batch = parse_frame_batch(BARE, Some(640), Some(480)).unwrap();
        assert_eq!((batch.width, batch.height), (640, 480));
        assert_eq!(batch.predictions.len(), 1);
        assert_eq!(batch.predictions[0].score, Some(0.9));
    }

    #[test]
    fn framed_document_carries_dimensions() {
        let raw = r#"{"width": 1280, "height": 720, "predictions": [
            {"class": "person", "score": 0.8, "bbox": [1, 2, 3, 4]},
            {"class": "car", "score": 0.7, "bbox": [5, 6, 7, 8]}
        ]}"#;
        let batch = parse_frame_batch(raw, None, None).unwrap();
        assert_eq!((batch.width, batch.height), (1280, 720));
        assert_eq!(batch.predictions.len(), 2);
    }

    #[test]
    fn caller_dimensions_override_document() {
        let raw = r#"{"width": 1280, "height": 720, "predictions": []}"#;
        let batch = parse_frame_batch(raw, Some(320), None).unwrap();
        assert_eq!((batch.width, batch.height), (320, 720));
        assert!(batch.predictions.is_empty());
    }

    #[test]
    fn missing_width_is_an_error() {
        let err = parse_frame_batch(BARE, None, Some(480)).unwrap_err();
        assert!(err.to_string().contains("width"));

        let raw = r#"{"height": 720, "predictions": []}"#;
        assert!(parse_frame_batch(raw, None, None).is_err());
    }

    #[test]
    fn missing_height_is_an_error() {
        let err = parse_frame_batch(BARE, Some(640), None).unwrap_err();
        assert!(err.to_string().contains("height"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_frame_batch("{\"predictions\": 3}", Some(1), Some(1)).is_err());
        assert!(parse_frame_batch("not json", Some(1), Some(1)).is_err());
    }
}
