//! Materialized frame handed to a detector backend.
//!
//! Pixel bytes stay private: backends read them through `pixels()`, nothing
//! downstream of inference ever sees them, and `Frame` is neither `Clone`
//! nor `Serialize`.

use anyhow::{anyhow, Result};

/// Bytes per pixel for packed RGB.
pub const RGB_CHANNELS: usize = 3;

pub struct Frame {
    data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Capture time in seconds since the Unix epoch.
    pub captured_at_s: u64,
}

impl Frame {
    /// Wrap packed RGB pixel data. Zero dimensions are allowed here; the
    /// classifier is the one that rejects them.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(RGB_CHANNELS))
            .ok_or_else(|| anyhow!("frame size {}x{} rgb overflows usize", width, height))?;
        if data.len() != expected {
            return Err(anyhow!(
                "frame buffer holds {} bytes, expected {} for {}x{} rgb",
                data.len(),
                expected,
                width,
                height
            ));
        }
        Ok(Self {
            data,
            width,
            height,
            captured_at_s: crate::now_s()?,
        })
    }

    pub fn with_capture_time(mut self, captured_at_s: u64) -> Self {
        self.captured_at_s = captured_at_s;
        self
    }

    /// Read-only pixel access for inference.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("captured_at_s", &self.captured_at_s)
            .finish_non_exhaustive()
    }
}
