//! density_classify - classify one frame's predictions from a JSON file
//!
//! Input is either a bare array of predictions (frame size from flags) or an
//! object `{ "width": .., "height": .., "predictions": [..] }`.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

use crowd_sentinel::{
    analyze_frame, parse_frame_batch, DensityClassification, FrameBatch,
    DEFAULT_CONFIDENCE_THRESHOLD,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Prediction file, or "-" for stdin.
    #[arg(long, default_value = "-")]
    input: PathBuf,
    /// Frame width in pixels (overrides the file).
    #[arg(long)]
    width: Option<u32>,
    /// Frame height in pixels (overrides the file).
    #[arg(long)]
    height: Option<u32>,
    /// Person confidence threshold (exclusive).
    #[arg(long, env = "SENTINEL_CONFIDENCE_THRESHOLD", default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    threshold: f64,
}

#[derive(Serialize)]
struct Output {
    width: u32,
    height: u32,
    threshold: f64,
    predictions: usize,
    person_count: usize,
    max_confidence: f64,
    classification: DensityClassification,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let raw = read_input(&args.input)?;
    let FrameBatch {
        width,
        height,
        predictions,
    } = parse_frame_batch(&raw, args.width, args.height)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let (set, classification) = analyze_frame(&predictions, args.threshold, width, height)?;
    log::info!(
        "{} predictions, {} retained, level {}",
        predictions.len(),
        set.person_count(),
        classification.level
    );

    let output = Output {
        width,
        height,
        threshold: args.threshold,
        predictions: predictions.len(),
        person_count: set.person_count(),
        max_confidence: set.max_confidence(),
        classification,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        return Ok(raw);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
