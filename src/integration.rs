//! Integration module for connecting inference backends with the pipeline.
//!
//! This module provides the tensor normalization adapter, the latest-frame-wins
//! hand-off and the end-to-end [`DetectionPipeline`].

mod builder;
mod frame_slot;
mod pipeline;
mod tensor;

pub use builder::DetectionBuilder;
pub use frame_slot::{FramePublisher, FrameReceiver, frame_slot};
pub use pipeline::{DetectionPipeline, FrameInput, FrameResult};
pub use tensor::{IntoRawTensor, OwnedTensor};
