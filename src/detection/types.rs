//! Detection value type shared by every pipeline stage.

use serde::Serialize;

use crate::detection::bbox::BoundingBox;
use crate::detection::labels::class_name;

/// A labeled bounding box with a confidence score.
///
/// Immutable once built: stages that change a score or a box produce a new
/// `Detection` through the `with_*` methods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    bbox: BoundingBox,
    class_index: usize,
    confidence: f32,
}

impl Detection {
    /// Create a detection. Confidence is clamped into `[0, 1]`.
    pub fn new(bbox: BoundingBox, class_index: usize, confidence: f32) -> Self {
        Self {
            bbox,
            class_index,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    #[inline]
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    #[inline]
    pub fn class_index(&self) -> usize {
        self.class_index
    }

    #[inline]
    pub fn class_name(&self) -> &'static str {
        class_name(self.class_index)
    }

    #[inline]
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Same box and class with a different confidence.
    pub fn with_confidence(&self, confidence: f32) -> Self {
        Self::new(self.bbox, self.class_index, confidence)
    }

    /// Same class and confidence with a different box.
    pub fn with_bbox(&self, bbox: BoundingBox) -> Self {
        Self { bbox, ..*self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_accessors() {
        let bbox = BoundingBox::from_ltrb(10.0, 20.0, 50.0, 80.0).unwrap();
        let det = Detection::new(bbox, 2, 0.9);
        assert_eq!(det.class_index(), 2);
        assert_eq!(det.class_name(), "car");
        assert_eq!(det.confidence(), 0.9);
        assert_eq!(det.bbox().to_ltrb(), [10.0, 20.0, 50.0, 80.0]);
    }

    #[test]
    fn test_confidence_clamped() {
        let bbox = BoundingBox::from_ltrb(0.0, 0.0, 1.0, 1.0).unwrap();
        assert_eq!(Detection::new(bbox, 0, 1.7).confidence(), 1.0);
        assert_eq!(Detection::new(bbox, 0, -0.2).confidence(), 0.0);
    }

    #[test]
    fn test_with_confidence_keeps_geometry() {
        let bbox = BoundingBox::from_ltrb(0.0, 0.0, 10.0, 10.0).unwrap();
        let det = Detection::new(bbox, 5, 0.8);
        let decayed = det.with_confidence(0.4);
        assert_eq!(decayed.bbox(), det.bbox());
        assert_eq!(decayed.class_index(), 5);
        assert_eq!(decayed.confidence(), 0.4);
        assert_eq!(det.confidence(), 0.8);
    }
}
