use thiserror::Error;

/// Rejection raised by the detection normalizer.
///
/// The batch that produced it should be discarded or re-fetched; it is never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("invalid prediction at index {index}: {reason}")]
    InvalidInput { index: usize, reason: String },

    #[error("invalid confidence threshold {0}: must be within 0..=1")]
    InvalidThreshold(f64),
}

/// Rejection raised by the density classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("invalid frame dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Umbrella error for callers that run both stages back to back.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SentinelError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

impl NormalizeError {
    pub(crate) fn invalid(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            index,
            reason: reason.into(),
        }
    }
}
