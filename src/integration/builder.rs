//! Builder for creating Detection objects from various input formats.

use crate::detection::{BoundingBox, Detection};

/// Builder for creating `Detection` objects from various input formats.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    bbox: Option<BoundingBox>,
    class_index: usize,
    score: f32,
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in LTRB format (left, top, right, bottom).
    pub fn ltrb(mut self, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        self.bbox = BoundingBox::from_ltrb(left, top, right, bottom);
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = BoundingBox::from_xywh(cx, cy, w, h);
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, l: f32, t: f32, w: f32, h: f32) -> Self {
        self.bbox = BoundingBox::from_tlwh(l, t, w, h);
        self
    }

    /// Set the class index.
    pub fn class(mut self, class_index: usize) -> Self {
        self.class_index = class_index;
        self
    }

    /// Set the confidence score.
    pub fn score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Build the final `Detection`, or `None` if no valid box was set.
    pub fn build(self) -> Option<Detection> {
        self.bbox
            .map(|bbox| Detection::new(bbox, self.class_index, self.score))
    }
}
