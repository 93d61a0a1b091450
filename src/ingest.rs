//! Synthetic frame source.
//!
//! Produces packed RGB frames of a fixed size at a target rate. Used by the
//! monitor binary when predictions come from a replay script rather than a
//! live model, and by tests.

use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};

use crate::frame::{Frame, RGB_CHANNELS};

#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    pub width: u32,
    pub height: u32,
    /// Frames per second. 0 disables pacing.
    pub target_fps: u32,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            target_fps: 2,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SourceStats {
    pub frames_captured: u64,
    pub width: u32,
    pub height: u32,
}

pub struct SyntheticSource {
    config: SyntheticConfig,
    frame_count: u64,
    last_frame: Option<Instant>,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(anyhow!(
                "synthetic source needs positive dimensions, got {}x{}",
                config.width,
                config.height
            ));
        }
        log::info!(
            "SyntheticSource: {}x{} @ {} fps",
            config.width,
            config.height,
            config.target_fps
        );
        Ok(Self {
            config,
            frame_count: 0,
            last_frame: None,
        })
    }

    /// Capture the next frame, sleeping as needed to honor the target rate.
    pub fn next_frame(&mut self) -> Result<Frame> {
        self.pace();
        self.frame_count += 1;
        let pixels = self.generate_pixels();
        Frame::new(pixels, self.config.width, self.config.height)
    }

    fn pace(&mut self) {
        if self.config.target_fps > 0 {
            let interval = Duration::from_secs(1) / self.config.target_fps;
            if let Some(last) = self.last_frame {
                let elapsed = last.elapsed();
                if elapsed < interval {
                    std::thread::sleep(interval - elapsed);
                }
            }
        }
        self.last_frame = Some(Instant::now());
    }

    fn generate_pixels(&self) -> Vec<u8> {
        let len = self.config.width as usize * self.config.height as usize * RGB_CHANNELS;
        (0..len)
            .map(|i| ((i as u64 + self.frame_count) % 256) as u8)
            .collect()
    }

    pub fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            width: self.config.width,
            height: self.config.height,
        }
    }
}
