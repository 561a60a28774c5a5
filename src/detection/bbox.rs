use nalgebra::Vector4;
use ndarray::Array2;
use serde::Serialize;

/// Axis-aligned bounding box in source-image pixel coordinates.
///
/// Stored as LTRB: left, top, right, bottom. A box built through the checked
/// constructors always satisfies `right > left` and `bottom > top`.
///
/// Other common formats are accepted on construction:
/// - XYWH: Center X, Center Y, Width, Height
/// - TLWH: Top-Left X, Top-Left Y, Width, Height
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl BoundingBox {
    /// Create a box from LTRB coordinates.
    ///
    /// Returns `None` for zero or negative area and for non-finite coordinates.
    #[inline]
    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Option<Self> {
        let finite = left.is_finite() && top.is_finite() && right.is_finite() && bottom.is_finite();
        if finite && right > left && bottom > top {
            Some(Self {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }

    /// Create a box from XYWH format (center x, center y, width, height).
    #[inline]
    pub fn from_xywh(cx: f32, cy: f32, width: f32, height: f32) -> Option<Self> {
        Self::from_ltrb(
            cx - width / 2.0,
            cy - height / 2.0,
            cx + width / 2.0,
            cy + height / 2.0,
        )
    }

    /// Create a box from TLWH format (top-left x, top-left y, width, height).
    #[inline]
    pub fn from_tlwh(x: f32, y: f32, width: f32, height: f32) -> Option<Self> {
        Self::from_ltrb(x, y, x + width, y + height)
    }

    /// Rebuild a box from an `[l, t, r, b]` vector.
    #[inline]
    pub fn from_vector(v: &Vector4<f32>) -> Option<Self> {
        Self::from_ltrb(v[0], v[1], v[2], v[3])
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.left
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.top
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.right
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.bottom
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Convert to LTRB format: (left, top, right, bottom).
    #[inline]
    pub fn to_ltrb(&self) -> [f32; 4] {
        [self.left, self.top, self.right, self.bottom]
    }

    /// Convert to TLWH format: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [f32; 4] {
        [self.left, self.top, self.width(), self.height()]
    }

    #[inline]
    pub fn to_vector(&self) -> Vector4<f32> {
        Vector4::new(self.left, self.top, self.right, self.bottom)
    }

    /// Get the center point of the bounding box.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Get the area of the bounding box.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Clamp the box to `[0, width] x [0, height]`.
    ///
    /// Returns `None` if nothing of the box remains inside the image.
    pub fn clamp_to(&self, width: f32, height: f32) -> Option<Self> {
        Self::from_ltrb(
            self.left.clamp(0.0, width),
            self.top.clamp(0.0, height),
            self.right.clamp(0.0, width),
            self.bottom.clamp(0.0, height),
        )
    }

    /// Calculate Intersection over Union (IoU) with another bounding box.
    ///
    /// Disjoint boxes yield 0. A zero-area union yields 0 rather than NaN.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x1 = self.left.max(other.left);
        let y1 = self.top.max(other.top);
        let x2 = self.right.min(other.right);
        let y2 = self.bottom.min(other.bottom);

        let inter_width = (x2 - x1).max(0.0);
        let inter_height = (y2 - y1).max(0.0);
        let inter_area = inter_width * inter_height;

        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0.0 {
            inter_area / union_area
        } else {
            0.0
        }
    }
}

/// Calculate IoU matrix between two sets of bounding boxes.
///
/// Returns a matrix of shape (M, N) where M is the length of `boxes_a`
/// and N is the length of `boxes_b`.
pub fn iou_batch(boxes_a: &[BoundingBox], boxes_b: &[BoundingBox]) -> Array2<f32> {
    let mut ious = Array2::zeros((boxes_a.len(), boxes_b.len()));
    for (i, a) in boxes_a.iter().enumerate() {
        for (j, b) in boxes_b.iter().enumerate() {
            ious[[i, j]] = a.iou(b);
        }
    }
    ious
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(l: f32, t: f32, r: f32, b: f32) -> BoundingBox {
        BoundingBox::from_ltrb(l, t, r, b).unwrap()
    }

    #[test]
    fn test_box_conversions() {
        let b = BoundingBox::from_tlwh(10.0, 20.0, 30.0, 40.0).unwrap();
        assert_eq!(b.to_ltrb(), [10.0, 20.0, 40.0, 60.0]);
        assert_eq!(b.to_tlwh(), [10.0, 20.0, 30.0, 40.0]);
        assert_eq!(b.center(), (25.0, 40.0));
    }

    #[test]
    fn test_from_xywh() {
        let b = BoundingBox::from_xywh(25.0, 40.0, 30.0, 40.0).unwrap();
        assert!((b.left() - 10.0).abs() < 1e-6);
        assert!((b.top() - 20.0).abs() < 1e-6);
        assert!((b.width() - 30.0).abs() < 1e-6);
        assert!((b.height() - 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_rejected() {
        assert!(BoundingBox::from_ltrb(10.0, 10.0, 10.0, 20.0).is_none());
        assert!(BoundingBox::from_ltrb(10.0, 20.0, 15.0, 5.0).is_none());
        assert!(BoundingBox::from_ltrb(f32::NAN, 0.0, 10.0, 10.0).is_none());
        assert!(BoundingBox::from_xywh(5.0, 5.0, 0.0, 3.0).is_none());
    }

    #[test]
    fn test_clamp() {
        let b = bbox(-20.0, -5.0, 50.0, 700.0);
        let c = b.clamp_to(640.0, 480.0).unwrap();
        assert_eq!(c.to_ltrb(), [0.0, 0.0, 50.0, 480.0]);

        // Entirely outside the image.
        let outside = bbox(700.0, 10.0, 800.0, 20.0);
        assert!(outside.clamp_to(640.0, 480.0).is_none());
    }

    #[test]
    fn test_vector_round_trip() {
        let b = bbox(1.0, 2.0, 3.0, 4.0);
        assert_eq!(BoundingBox::from_vector(&b.to_vector()), Some(b));
    }

    #[test]
    fn test_iou() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        let b = bbox(5.0, 5.0, 15.0, 15.0);

        // Intersection: 5x5 = 25
        // Union: 100 + 100 - 25 = 175
        let iou = a.iou(&b);
        assert!((iou - 25.0 / 175.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        let b = bbox(20.0, 20.0, 30.0, 30.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_same_box() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_zero_union() {
        let zero = BoundingBox {
            left: 5.0,
            top: 5.0,
            right: 5.0,
            bottom: 5.0,
        };
        assert_eq!(zero.iou(&zero), 0.0);
    }

    #[test]
    fn test_iou_batch_shape() {
        let a = [bbox(0.0, 0.0, 10.0, 10.0), bbox(50.0, 50.0, 60.0, 60.0)];
        let b = [bbox(0.0, 0.0, 10.0, 10.0)];
        let m = iou_batch(&a, &b);
        assert_eq!(m.dim(), (2, 1));
        assert!((m[[0, 0]] - 1.0).abs() < 1e-6);
        assert_eq!(m[[1, 0]], 0.0);
    }
}
