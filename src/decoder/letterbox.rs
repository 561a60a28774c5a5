//! Letterbox geometry used to map model-space boxes back to the source image.

use serde::{Deserialize, Serialize};

/// Uniform scale plus padding applied when fitting a source image into the
/// square model input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: i32,
    pub pad_y: i32,
}

impl Letterbox {
    pub fn new(scale: f32, pad_x: i32, pad_y: i32) -> Self {
        Self {
            scale,
            pad_x,
            pad_y,
        }
    }

    /// No scaling and no padding.
    pub fn identity() -> Self {
        Self::new(1.0, 0, 0)
    }

    /// Letterbox a `src_width x src_height` image into a `model_size` square:
    /// scale by the limiting side, then center the resized image.
    pub fn fit(src_width: u32, src_height: u32, model_size: u32) -> Self {
        let w0 = src_width.max(1) as f32;
        let h0 = src_height.max(1) as f32;
        let m = model_size as f32;
        let scale = (m / w0).min(m / h0);
        let new_w = (w0 * scale).round();
        let new_h = (h0 * scale).round();
        Self {
            scale,
            pad_x: ((m - new_w) / 2.0).floor() as i32,
            pad_y: ((m - new_h) / 2.0).floor() as i32,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.scale.is_finite() && self.scale > 0.0
    }

    /// Map a model-space center point back to source-image space.
    #[inline]
    pub fn unmap_point(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.pad_x as f32) / self.scale,
            (y - self.pad_y as f32) / self.scale,
        )
    }

    /// Map a model-space length back to source-image space.
    #[inline]
    pub fn unmap_length(&self, len: f32) -> f32 {
        len / self.scale
    }
}

impl Default for Letterbox {
    fn default() -> Self {
        Self::identity()
    }
}

/// Per-frame geometry the decoder needs: original image size and the
/// letterbox that produced the model input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub image_width: u32,
    pub image_height: u32,
    pub letterbox: Letterbox,
}

impl FrameGeometry {
    pub fn new(image_width: u32, image_height: u32, letterbox: Letterbox) -> Self {
        Self {
            image_width,
            image_height,
            letterbox,
        }
    }

    /// Geometry of an image letterboxed into a `model_size` square.
    pub fn letterboxed(image_width: u32, image_height: u32, model_size: u32) -> Self {
        Self::new(
            image_width,
            image_height,
            Letterbox::fit(image_width, image_height, model_size),
        )
    }
}
