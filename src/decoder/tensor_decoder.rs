//! Decoding of raw detector output into candidate detections.

use ndarray::{ArrayView1, s};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::decoder::layout::{BOX_FEATURES, RawOutput, TensorLayout};
use crate::decoder::letterbox::FrameGeometry;
use crate::detection::{BoundingBox, Detection, NUM_CLASSES};
use crate::error::Result;

/// Coordinates with a magnitude below this are read as normalized `0..1`
/// values on the direct `[N, 84]` path.
const NORMALIZED_LIMIT: f32 = 1.0;

/// Upper bound on the candidate buffer reserved up front.
const MAX_PREALLOCATED_CANDIDATES: usize = 1024;

/// Configuration for the [`TensorDecoder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Scores below this floor are dropped during decoding. Must not exceed
    /// any confidence threshold applied downstream.
    pub score_floor: f32,
    /// Boxes narrower or shorter than this (source pixels) are decode noise.
    pub min_box_size: f32,
    /// Side of the square model input in pixels.
    pub model_input_size: u32,
    /// Read unbatched `[N, 84]` boxes with the per-value normalized/absolute
    /// heuristic instead of the letterbox inverse. Batched and feature-major
    /// outputs always go through the letterbox inverse.
    pub direct_coordinate_heuristic: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            score_floor: 0.20,
            min_box_size: 10.0,
            model_input_size: 640,
            direct_coordinate_heuristic: true,
        }
    }
}

/// Converts raw detector output into preliminary detections in source-image
/// pixel space.
///
/// Stateless: decoding depends only on the buffer, its shape and the frame
/// geometry. Unrecognized shapes decode to an empty list.
#[derive(Debug, Clone, Default)]
pub struct TensorDecoder {
    config: DecoderConfig,
}

impl TensorDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode one frame of detector output.
    ///
    /// Malformed shapes and invalid letterbox parameters yield `Ok(vec![])`.
    /// The only error is failure to allocate the candidate buffer.
    pub fn decode(&self, output: &RawOutput<'_>, frame: &FrameGeometry) -> Result<Vec<Detection>> {
        let Some(layout) = TensorLayout::infer(output.shape(), output.data().len()) else {
            warn!(
                shape = ?output.shape(),
                len = output.data().len(),
                "unrecognized detector output shape, skipping frame"
            );
            return Ok(Vec::new());
        };
        if !frame.letterbox.is_valid() {
            warn!(scale = frame.letterbox.scale, "invalid letterbox scale, skipping frame");
            return Ok(Vec::new());
        }
        let Some(view) = layout.view(output.data()) else {
            warn!(?layout, "output buffer does not match inferred layout");
            return Ok(Vec::new());
        };
        if !layout.matched {
            debug!(
                num_predictions = layout.num_predictions,
                num_features = layout.num_features,
                "no axis matched the feature count, reading last axis as predictions"
            );
        }

        let direct = layout.direct && self.config.direct_coordinate_heuristic;
        let num_classes = (layout.num_features - BOX_FEATURES).min(NUM_CLASSES);

        let mut detections = Vec::new();
        detections.try_reserve(layout.num_predictions.min(MAX_PREALLOCATED_CANDIDATES))?;

        for row in view.rows() {
            let Some((class_index, score)) = best_class(&row, num_classes) else {
                continue;
            };
            if score < self.config.score_floor {
                continue;
            }

            let bbox = if direct {
                self.direct_box(&row, frame)
            } else {
                self.letterboxed_box(&row, frame)
            };
            let (width, height) = (frame.image_width as f32, frame.image_height as f32);
            let Some(bbox) = bbox.and_then(|b| b.clamp_to(width, height)) else {
                continue;
            };
            if bbox.width() < self.config.min_box_size || bbox.height() < self.config.min_box_size {
                continue;
            }

            if detections.len() == detections.capacity() {
                detections.try_reserve(1)?;
            }
            detections.push(Detection::new(bbox, class_index, score));
        }

        debug!(
            layout = ?layout.kind,
            candidates = detections.len(),
            "decoded detector output"
        );
        Ok(detections)
    }

    /// Undo the letterbox: remove padding, divide by scale.
    fn letterboxed_box(
        &self,
        row: &ArrayView1<'_, f32>,
        frame: &FrameGeometry,
    ) -> Option<BoundingBox> {
        let lb = &frame.letterbox;
        let (cx, cy) = lb.unmap_point(row[0], row[1]);
        BoundingBox::from_xywh(cx, cy, lb.unmap_length(row[2]), lb.unmap_length(row[3]))
    }

    /// Per-value heuristic: magnitudes below 1 are normalized to the image,
    /// anything else is in model-input pixels.
    fn direct_box(&self, row: &ArrayView1<'_, f32>, frame: &FrameGeometry) -> Option<BoundingBox> {
        let model = self.config.model_input_size as f32;
        let (img_w, img_h) = (frame.image_width as f32, frame.image_height as f32);
        let to_image = |v: f32, dim: f32| {
            if v.abs() < NORMALIZED_LIMIT {
                v * dim
            } else {
                v * dim / model
            }
        };
        BoundingBox::from_xywh(
            to_image(row[0], img_w),
            to_image(row[1], img_h),
            to_image(row[2], img_w),
            to_image(row[3], img_h),
        )
    }
}

/// Argmax over the class-score features. NaN scores never win.
fn best_class(row: &ArrayView1<'_, f32>, num_classes: usize) -> Option<(usize, f32)> {
    let scores = row.slice(s![BOX_FEATURES..BOX_FEATURES + num_classes]);
    let mut best: Option<(usize, f32)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        match best {
            Some((_, top)) if score <= top => {}
            _ if score.is_nan() => {}
            _ => best = Some((idx, score)),
        }
    }
    best
}
