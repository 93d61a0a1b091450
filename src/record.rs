//! Record payloads for the camera and alert tables, and the sink they are handed to.
//!
//! Storage itself lives outside this crate. A `RecordSink` is whatever the
//! deployment uses to persist these payloads; field names match the tables.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::density::DensityClassification;
use crate::detect::NormalizedDetectionSet;

/// Partial update applied to a camera record after each classified frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CameraDetectionUpdate {
    #[serde(rename = "Id")]
    pub id: u32,
    /// `"<n> person(s)"` or `"none"`.
    pub object_detected: String,
    /// Highest retained confidence as a whole percentage.
    pub confidence_level: u8,
    pub alert_level: u8,
    /// Capture time, seconds since the Unix epoch.
    pub last_active: u64,
}

impl CameraDetectionUpdate {
    pub fn from_classification(
        camera_id: u32,
        set: &NormalizedDetectionSet,
        classification: &DensityClassification,
        captured_at_s: u64,
    ) -> Self {
        let object_detected = if set.person_count() > 0 {
            format!("{} person(s)", set.person_count())
        } else {
            "none".to_string()
        };
        Self {
            id: camera_id,
            object_detected,
            confidence_level: confidence_percent(set.max_confidence()),
            alert_level: classification.level,
            last_active: captured_at_s,
        }
    }
}

/// New alert raised when a classification reaches the configured level.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AlertDraft {
    pub camera_id: u32,
    pub message: String,
    /// Density name: `low`, `medium`, `high` or `critical`.
    pub priority: String,
    pub acknowledged: bool,
    pub created_at: u64,
}

impl AlertDraft {
    pub fn from_classification(
        camera_id: u32,
        classification: &DensityClassification,
        created_at: u64,
    ) -> Self {
        Self {
            camera_id,
            message: format!("Camera {}: {}", camera_id, classification.description),
            priority: classification.density.as_str().to_string(),
            acknowledged: false,
            created_at,
        }
    }
}

fn confidence_percent(confidence: f64) -> u8 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Destination for record payloads.
pub trait RecordSink {
    fn update_camera(&mut self, update: &CameraDetectionUpdate) -> Result<()>;

    fn create_alert(&mut self, alert: &AlertDraft) -> Result<()>;
}

/// Keeps every payload in memory.
#[derive(Debug, Default)]
pub struct InMemoryRecordSink {
    pub camera_updates: Vec<CameraDetectionUpdate>,
    pub alerts: Vec<AlertDraft>,
}

impl InMemoryRecordSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordSink for InMemoryRecordSink {
    fn update_camera(&mut self, update: &CameraDetectionUpdate) -> Result<()> {
        self.camera_updates.push(update.clone());
        Ok(())
    }

    fn create_alert(&mut self, alert: &AlertDraft) -> Result<()> {
        self.alerts.push(alert.clone());
        Ok(())
    }
}

#[derive(Serialize)]
struct TableLine<'a, T: Serialize> {
    table: &'static str,
    record: &'a T,
}

/// Writes one JSON object per line, tagged with the target table.
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line<T: Serialize>(&mut self, table: &'static str, record: &T) -> Result<()> {
        serde_json::to_writer(&mut self.out, &TableLine { table, record })?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn update_camera(&mut self, update: &CameraDetectionUpdate) -> Result<()> {
        self.write_line("camera", update)
    }

    fn create_alert(&mut self, alert: &AlertDraft) -> Result<()> {
        self.write_line("alert", alert)
    }
}
