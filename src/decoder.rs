//! Tensor decoding stage: raw detector output to candidate detections.
//!
//! Both feature-major (`[1, 84, N]`) and prediction-major (`[N, 84]`) layouts
//! are recognized from the shape alone.

mod layout;
mod letterbox;
mod tensor_decoder;

pub use layout::{DEFAULT_FEATURE_COUNT, LayoutKind, RawOutput, TensorLayout};
pub use letterbox::{FrameGeometry, Letterbox};
pub use tensor_decoder::{DecoderConfig, TensorDecoder};
