//! Per-frame monitoring pipeline.
//!
//! frame -> backend inference -> normalize -> classify -> records.
//!
//! A frame that cannot be classified is skipped and counted; the monitor
//! keeps going. Record sink failures are logged but do not discard the
//! classification.

use std::sync::TryLockError;

use serde::Serialize;

use crate::density::{classify_density, DensityClassification, DensitySummary};
use crate::detect::{normalize_predictions, SharedBackend, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::error::{ClassifyError, NormalizeError};
use crate::frame::Frame;
use crate::record::{AlertDraft, CameraDetectionUpdate, RecordSink};

pub const DEFAULT_ALERT_MIN_LEVEL: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonitorSettings {
    pub confidence_threshold: f64,
    /// Classifications at or above this level also raise an alert record.
    pub alert_min_level: u8,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            alert_min_level: DEFAULT_ALERT_MIN_LEVEL,
        }
    }
}

/// Why a frame produced no classification.
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    /// Another caller is still running inference on the shared backend.
    BackendBusy,
    /// The backend failed or its lock was poisoned.
    Inference(String),
    InvalidInput(NormalizeError),
    InvalidDimensions(ClassifyError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub classification: DensityClassification,
    pub max_confidence: f64,
    pub alert_raised: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    Classified(FrameReport),
    Skipped(SkipReason),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MonitorStats {
    pub frames_seen: u64,
    pub frames_classified: u64,
    pub frames_skipped: u64,
    pub alerts_raised: u64,
    pub sink_failures: u64,
}

pub struct DensityMonitor<S: RecordSink> {
    camera_id: u32,
    backend: SharedBackend,
    sink: S,
    settings: MonitorSettings,
    stats: MonitorStats,
    summary: DensitySummary,
}

impl<S: RecordSink> DensityMonitor<S> {
    pub fn new(camera_id: u32, backend: SharedBackend, sink: S, settings: MonitorSettings) -> Self {
        Self {
            camera_id,
            backend,
            sink,
            settings,
            stats: MonitorStats::default(),
            summary: DensitySummary::new(),
        }
    }

    pub fn process_frame(&mut self, frame: &Frame) -> FrameOutcome {
        self.stats.frames_seen += 1;
        match self.classify_frame(frame) {
            Ok((report, update)) => {
                self.publish(&report, &update, frame.captured_at_s);
                self.summary.record(&report.classification);
                self.stats.frames_classified += 1;
                FrameOutcome::Classified(report)
            }
            Err(reason) => {
                log::warn!(
                    "camera {}: skipping frame {}: {:?}",
                    self.camera_id,
                    self.stats.frames_seen,
                    reason
                );
                self.stats.frames_skipped += 1;
                FrameOutcome::Skipped(reason)
            }
        }
    }

    fn classify_frame(
        &self,
        frame: &Frame,
    ) -> Result<(FrameReport, CameraDetectionUpdate), SkipReason> {
        let predictions = {
            let mut backend = match self.backend.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::WouldBlock) => return Err(SkipReason::BackendBusy),
                Err(TryLockError::Poisoned(_)) => {
                    return Err(SkipReason::Inference("backend lock poisoned".to_string()))
                }
            };
            backend
                .detect(frame)
                .map_err(|e| SkipReason::Inference(e.to_string()))?
        };

        let set = normalize_predictions(&predictions, self.settings.confidence_threshold)
            .map_err(SkipReason::InvalidInput)?;
        let classification = classify_density(&set, frame.width, frame.height)
            .map_err(SkipReason::InvalidDimensions)?;

        let update = CameraDetectionUpdate::from_classification(
            self.camera_id,
            &set,
            &classification,
            frame.captured_at_s,
        );
        let report = FrameReport {
            alert_raised: classification.is_alert(self.settings.alert_min_level),
            max_confidence: set.max_confidence(),
            classification,
        };
        Ok((report, update))
    }

    fn publish(&mut self, report: &FrameReport, update: &CameraDetectionUpdate, at: u64) {
        if let Err(e) = self.sink.update_camera(update) {
            log::error!("camera {}: record update failed: {}", self.camera_id, e);
            self.stats.sink_failures += 1;
        }

        if !report.alert_raised {
            return;
        }
        let alert = AlertDraft::from_classification(self.camera_id, &report.classification, at);
        log::info!(
            "camera {}: {} alert: {}",
            self.camera_id,
            alert.priority,
            report.classification.description
        );
        match self.sink.create_alert(&alert) {
            Ok(()) => self.stats.alerts_raised += 1,
            Err(e) => {
                log::error!("camera {}: alert creation failed: {}", self.camera_id, e);
                self.stats.sink_failures += 1;
            }
        }
    }

    pub fn camera_id(&self) -> u32 {
        self.camera_id
    }

    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }

    pub fn summary(&self) -> &DensitySummary {
        &self.summary
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
