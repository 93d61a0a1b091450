//! density_monitor - replay recorded predictions through the monitor pipeline
//!
//! This binary:
//! 1. Loads `MonitorConfig` (SENTINEL_CONFIG + SENTINEL_* overrides)
//! 2. Replays prediction batches from `replay_path` over synthetic frames
//! 3. Writes camera and alert records as JSON lines to stdout
//! 4. Logs a density summary on exit (Ctrl-C or --frames reached)

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crowd_sentinel::config::MonitorConfig;
use crowd_sentinel::detect::{require_class, share};
use crowd_sentinel::{
    DensityLevel, DensityMonitor, FrameOutcome, JsonLinesSink, ScriptedBackend, SyntheticSource,
    PERSON_CLASS,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Stop after this many frames (runs until Ctrl-C otherwise).
    #[arg(long)]
    frames: Option<u64>,
    /// Start the replay script over when it runs out.
    #[arg(long)]
    repeat: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let cfg = MonitorConfig::load()?;

    let replay_path = cfg
        .replay_path
        .as_ref()
        .ok_or_else(|| anyhow!("replay_path must be set (config file or SENTINEL_REPLAY_PATH)"))?;
    let file = File::open(replay_path)
        .with_context(|| format!("failed to open replay script {}", replay_path.display()))?;
    let scripted = ScriptedBackend::from_json_lines(BufReader::new(file))?.repeating(args.repeat);
    log::info!(
        "loaded {} prediction batches from {}",
        scripted.remaining(),
        replay_path.display()
    );

    let backend = share(scripted);
    require_class(&backend, PERSON_CLASS)?;
    backend
        .lock()
        .map_err(|_| anyhow!("backend lock poisoned"))?
        .warm_up()?;

    let mut source = SyntheticSource::new(cfg.source_config())?;
    let sink = JsonLinesSink::new(std::io::stdout().lock());
    let mut monitor = DensityMonitor::new(cfg.camera_id, backend, sink, cfg.monitor_settings());

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || {
        flag.store(false, Ordering::SeqCst);
    })
    .expect("error setting Ctrl-C handler");

    log::info!(
        "density_monitor running: camera={} threshold={} alert_min_level={}",
        cfg.camera_id,
        cfg.confidence_threshold,
        cfg.alert_min_level
    );

    let mut last_health_log = Instant::now();
    while running.load(Ordering::SeqCst) {
        if args.frames.is_some_and(|limit| monitor.stats().frames_seen >= limit) {
            break;
        }

        let frame = source.next_frame()?;
        if let FrameOutcome::Classified(report) = monitor.process_frame(&frame) {
            log::debug!(
                "frame {}: {}",
                monitor.stats().frames_seen,
                report.classification.description
            );
        }

        if last_health_log.elapsed() >= Duration::from_secs(10) {
            let stats = monitor.stats();
            log::info!(
                "frames={} classified={} skipped={} alerts={}",
                stats.frames_seen,
                stats.frames_classified,
                stats.frames_skipped,
                stats.alerts_raised
            );
            last_health_log = Instant::now();
        }
    }

    let stats = monitor.stats();
    let summary = monitor.summary();
    log::info!(
        "stopped after {} frames ({} classified, {} skipped, {} alerts, {} sink failures)",
        stats.frames_seen,
        stats.frames_classified,
        stats.frames_skipped,
        stats.alerts_raised,
        stats.sink_failures
    );
    log::info!(
        "avg people {:.2}, avg density ratio {:.3}, peak level {}",
        summary.average_people(),
        summary.average_ratio(),
        summary.peak_level()
    );
    for density in DensityLevel::ALL {
        log::info!("  {}: {}", density, summary.count_for(density));
    }
    log::info!("  none: {}", summary.no_people_samples());

    Ok(())
}
