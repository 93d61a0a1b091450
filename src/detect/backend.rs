use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use crate::detect::result::RawPrediction;
use crate::frame::Frame;

/// Object-detection inference collaborator.
///
/// The classification core never touches cameras or models directly; it is
/// handed whatever an implementation of this trait produced for a frame.
/// Implementations must treat the frame as read-only and must not retain it
/// beyond the `detect` call.
pub trait DetectorBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Returns true when the backend can emit predictions with this class label.
    fn supports_class(&self, class: &str) -> bool;

    /// Run inference on a frame and return the raw, unfiltered predictions.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<RawPrediction>>;

    /// Optional warm-up hook (model load).
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Backend handle shared between monitors.
///
/// Wrapped in `Mutex` because `DetectorBackend::detect` takes `&mut self`.
pub type SharedBackend = Arc<Mutex<dyn DetectorBackend>>;

pub fn share<B: DetectorBackend + 'static>(backend: B) -> SharedBackend {
    Arc::new(Mutex::new(backend))
}

/// Fail unless the backend can emit the given class label.
pub fn require_class(backend: &SharedBackend, class: &str) -> Result<()> {
    let guard = backend
        .lock()
        .map_err(|_| anyhow!("backend lock poisoned"))?;
    if guard.supports_class(class) {
        Ok(())
    } else {
        Err(anyhow!(
            "backend '{}' does not emit class '{}'",
            guard.name(),
            class
        ))
    }
}
