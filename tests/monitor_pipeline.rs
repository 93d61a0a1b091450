//! Monitor pipeline behavior: skips, alerts, sink failures, backpressure.

use anyhow::{anyhow, Result};
use crowd_sentinel::{
    AlertDraft, CameraDetectionUpdate, DensityLevel, DensityMonitor, DetectorBackend,
    FrameOutcome, Frame, InMemoryRecordSink, MonitorSettings, RawPrediction, RecordSink,
    ScriptedBackend, SkipReason,
};
use crowd_sentinel::detect::share;

const WIDTH: u32 = 64;
const HEIGHT: u32 = 48;

fn frame() -> Frame {
    Frame::new(vec![0u8; (WIDTH * HEIGHT * 3) as usize], WIDTH, HEIGHT)
        .expect("frame")
        .with_capture_time(1_700_000_000)
}

fn person(score: f64, w: f64, h: f64) -> RawPrediction {
    RawPrediction::new("person", score, [0.0, 0.0, w, h])
}

struct FailingBackend;

impl DetectorBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn supports_class(&self, _class: &str) -> bool {
        true
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Vec<RawPrediction>> {
        Err(anyhow!("model not loaded"))
    }
}

#[derive(Default)]
struct BrokenSink {
    attempts: usize,
}

impl RecordSink for BrokenSink {
    fn update_camera(&mut self, _update: &CameraDetectionUpdate) -> Result<()> {
        self.attempts += 1;
        Err(anyhow!("table api unavailable"))
    }

    fn create_alert(&mut self, _alert: &AlertDraft) -> Result<()> {
        self.attempts += 1;
        Err(anyhow!("table api unavailable"))
    }
}

#[test]
fn classifies_frames_and_writes_camera_updates() {
    // 64x48 = 3072 px; one 10x15 box is ~4.9% of the frame.
    let backend = ScriptedBackend::new(vec![
        vec![person(0.9, 10.0, 15.0), person(0.3, 10.0, 15.0)],
        vec![],
    ]);
    let mut monitor = DensityMonitor::new(
        4,
        share(backend),
        InMemoryRecordSink::new(),
        MonitorSettings::default(),
    );

    let FrameOutcome::Classified(first) = monitor.process_frame(&frame()) else {
        panic!("first frame should classify");
    };
    assert_eq!(first.classification.level, 1);
    assert_eq!(first.max_confidence, 0.9);
    assert!(!first.alert_raised);

    let FrameOutcome::Classified(second) = monitor.process_frame(&frame()) else {
        panic!("second frame should classify");
    };
    assert_eq!(second.classification.level, 0);

    let sink = monitor.sink();
    assert_eq!(sink.camera_updates.len(), 2);
    assert_eq!(sink.camera_updates[0].id, 4);
    assert_eq!(sink.camera_updates[0].object_detected, "1 person(s)");
    assert_eq!(sink.camera_updates[0].confidence_level, 90);
    assert_eq!(sink.camera_updates[0].last_active, 1_700_000_000);
    assert_eq!(sink.camera_updates[1].object_detected, "none");
    assert!(sink.alerts.is_empty());

    assert_eq!(monitor.summary().samples(), 2);
    assert_eq!(monitor.summary().peak_level(), 1);
}

#[test]
fn crowded_frame_raises_alert() {
    let crowd: Vec<RawPrediction> = (0..12).map(|_| person(0.8, 8.0, 8.0)).collect();
    let backend = ScriptedBackend::new(vec![crowd]);
    let mut monitor = DensityMonitor::new(
        2,
        share(backend),
        InMemoryRecordSink::new(),
        MonitorSettings::default(),
    );

    let FrameOutcome::Classified(report) = monitor.process_frame(&frame()) else {
        panic!("frame should classify");
    };
    assert_eq!(report.classification.density, DensityLevel::Critical);
    assert!(report.alert_raised);

    let sink = monitor.into_sink();
    assert_eq!(sink.alerts.len(), 1);
    assert_eq!(sink.alerts[0].priority, "critical");
    assert_eq!(sink.alerts[0].created_at, 1_700_000_000);
    assert_eq!(sink.camera_updates[0].alert_level, 4);
}

#[test]
fn alert_threshold_is_configurable() {
    let backend = ScriptedBackend::new(vec![vec![person(0.9, 10.0, 15.0)]]);
    let settings = MonitorSettings {
        alert_min_level: 1,
        ..MonitorSettings::default()
    };
    let mut monitor = DensityMonitor::new(1, share(backend), InMemoryRecordSink::new(), settings);
    monitor.process_frame(&frame());
    assert_eq!(monitor.sink().alerts.len(), 1);
    assert_eq!(monitor.sink().alerts[0].priority, "low");
    assert_eq!(monitor.stats().alerts_raised, 1);
}

#[test]
fn malformed_batch_skips_frame_and_continues() {
    let malformed = RawPrediction {
        bbox: None,
        ..person(0.9, 1.0, 1.0)
    };
    let backend = ScriptedBackend::new(vec![vec![malformed], vec![person(0.9, 10.0, 15.0)]]);
    let mut monitor = DensityMonitor::new(
        1,
        share(backend),
        InMemoryRecordSink::new(),
        MonitorSettings::default(),
    );

    assert!(matches!(
        monitor.process_frame(&frame()),
        FrameOutcome::Skipped(SkipReason::InvalidInput(_))
    ));
    assert!(matches!(
        monitor.process_frame(&frame()),
        FrameOutcome::Classified(_)
    ));
    assert_eq!(monitor.stats().frames_skipped, 1);
    assert_eq!(monitor.stats().frames_classified, 1);
    assert_eq!(monitor.sink().camera_updates.len(), 1);
}

#[test]
fn zero_sized_frame_is_skipped() {
    let backend = ScriptedBackend::new(vec![vec![person(0.9, 10.0, 15.0)]]);
    let mut monitor = DensityMonitor::new(
        1,
        share(backend),
        InMemoryRecordSink::new(),
        MonitorSettings::default(),
    );
    let empty = Frame::new(Vec::new(), 0, HEIGHT).expect("frame");
    assert!(matches!(
        monitor.process_frame(&empty),
        FrameOutcome::Skipped(SkipReason::InvalidDimensions(_))
    ));
    assert!(monitor.sink().camera_updates.is_empty());
}

#[test]
fn inference_failure_is_skipped() {
    let mut monitor = DensityMonitor::new(
        1,
        share(FailingBackend),
        InMemoryRecordSink::new(),
        MonitorSettings::default(),
    );
    match monitor.process_frame(&frame()) {
        FrameOutcome::Skipped(SkipReason::Inference(msg)) => assert!(msg.contains("model")),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(monitor.stats().frames_seen, 1);
    assert_eq!(monitor.stats().frames_skipped, 1);
}

#[test]
fn sink_failure_does_not_drop_classification() {
    let crowd: Vec<RawPrediction> = (0..12).map(|_| person(0.8, 8.0, 8.0)).collect();
    let backend = ScriptedBackend::new(vec![crowd]);
    let mut monitor = DensityMonitor::new(
        1,
        share(backend),
        BrokenSink::default(),
        MonitorSettings::default(),
    );

    assert!(matches!(
        monitor.process_frame(&frame()),
        FrameOutcome::Classified(_)
    ));
    assert_eq!(monitor.stats().sink_failures, 2);
    assert_eq!(monitor.stats().alerts_raised, 0);
    assert_eq!(monitor.summary().samples(), 1);
    assert_eq!(monitor.sink().attempts, 2);
}

#[test]
fn busy_backend_skips_frame() {
    let backend = share(ScriptedBackend::new(vec![vec![person(0.9, 10.0, 15.0)]]));
    let mut monitor = DensityMonitor::new(
        1,
        backend.clone(),
        InMemoryRecordSink::new(),
        MonitorSettings::default(),
    );

    let held = backend.lock().expect("lock");
    assert_eq!(
        monitor.process_frame(&frame()),
        FrameOutcome::Skipped(SkipReason::BackendBusy)
    );
    drop(held);

    assert!(matches!(
        monitor.process_frame(&frame()),
        FrameOutcome::Classified(_)
    ));
}

#[test]
fn monitors_share_a_backend_across_threads() {
    let script: Vec<Vec<RawPrediction>> = (0..40).map(|_| vec![person(0.9, 10.0, 15.0)]).collect();
    let backend = share(ScriptedBackend::new(script));

    let handles: Vec<_> = (0..4)
        .map(|camera_id| {
            let backend = backend.clone();
            std::thread::spawn(move || {
                let mut monitor = DensityMonitor::new(
                    camera_id,
                    backend,
                    InMemoryRecordSink::new(),
                    MonitorSettings::default(),
                );
                for _ in 0..10 {
                    monitor.process_frame(&frame());
                }
                monitor.stats().clone()
            })
        })
        .collect();

    let mut seen = 0;
    for handle in handles {
        let stats = handle.join().expect("monitor thread");
        assert_eq!(stats.frames_classified + stats.frames_skipped, 10);
        seen += stats.frames_seen;
    }
    assert_eq!(seen, 40);
}
