//! Detection decoding, Soft-NMS suppression and temporal tracking for
//! YOLO-style detector output.
//!
//! Data flows strictly forward, once per camera frame:
//!
//! 1. [`TensorDecoder`] reads a raw output buffer (feature-major or
//!    prediction-major) into candidate [`Detection`]s in source-image pixels.
//! 2. [`AdaptiveThreshold`] picks a confidence cutoff from scene density.
//! 3. [`SoftNms`] decays overlapping same-class candidates.
//! 4. [`TemporalTracker`] associates detections across frames, smooths boxes
//!    and hides single-frame flicker.
//!
//! [`DetectionPipeline`] wires the stages together.
//!
//! ```
//! use stabletrack_rs::{DetectionPipeline, FrameGeometry, OwnedTensor};
//!
//! let mut pipeline = DetectionPipeline::default();
//! let output = OwnedTensor::new(vec![0.0; 84 * 8400], vec![1, 84, 8400]).unwrap();
//! let frame = FrameGeometry::letterboxed(1280, 720, 640);
//! let result = pipeline.process(&output.as_raw(), &frame).unwrap();
//! assert!(result.detections.is_empty());
//! ```

pub mod config;
pub mod decoder;
pub mod detection;
pub mod error;
pub mod integration;
pub mod postprocess;
pub mod tracker;

pub use config::PipelineConfig;
pub use decoder::{DecoderConfig, FrameGeometry, Letterbox, RawOutput, TensorDecoder};
pub use detection::{BoundingBox, Detection};
pub use error::{Error, Result};
pub use integration::{
    DetectionBuilder, DetectionPipeline, FrameInput, FrameResult, IntoRawTensor, OwnedTensor,
    frame_slot,
};
pub use postprocess::{AdaptiveThreshold, SoftNms, SoftNmsConfig, ThresholdConfig};
pub use tracker::{TemporalTracker, Track, TrackId, TrackState, TrackerConfig, TrackerStats};
