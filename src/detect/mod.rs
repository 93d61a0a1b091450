//! Detection input side: raw predictions, the inference collaborator, and the normalizer.

mod backend;
mod backends;
mod batch;
mod normalize;
mod result;

pub use backend::{require_class, share, DetectorBackend, SharedBackend};
pub use backends::ScriptedBackend;
pub use batch::{parse_frame_batch, FrameBatch};
pub use normalize::{normalize_predictions, DEFAULT_CONFIDENCE_THRESHOLD};
pub use result::{BoundingBox, Detection, NormalizedDetectionSet, RawPrediction, PERSON_CLASS};
