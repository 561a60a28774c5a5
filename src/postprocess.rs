//! Per-frame filtering between decoding and tracking.

mod soft_nms;
mod threshold;

pub use soft_nms::{SoftNms, SoftNmsConfig};
pub use threshold::{AdaptiveThreshold, SceneDensity, ThresholdConfig};
