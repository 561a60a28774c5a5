//! DetectionPipeline combining decoding, suppression and tracking.

use std::time::Instant;

use serde::Serialize;
use tracing::{trace, warn};

use crate::config::PipelineConfig;
use crate::decoder::{FrameGeometry, RawOutput, TensorDecoder};
use crate::detection::Detection;
use crate::error::{Error, Result};
use crate::postprocess::{AdaptiveThreshold, SoftNms};
use crate::tracker::{TemporalTracker, TrackerStats};

use super::frame_slot::FrameReceiver;
use super::tensor::{IntoRawTensor, OwnedTensor};

/// Output of one pipeline cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameResult {
    /// Stable, smoothed detections ready for rendering
    pub detections: Vec<Detection>,
    pub active_tracks: usize,
    pub average_confidence: f32,
}

impl FrameResult {
    fn new(detections: Vec<Detection>, stats: TrackerStats) -> Self {
        Self {
            detections,
            active_tracks: stats.active_tracks,
            average_confidence: stats.average_confidence,
        }
    }
}

/// One frame of detector output waiting for the pipeline worker.
#[derive(Debug, Clone)]
pub struct FrameInput {
    pub tensor: OwnedTensor,
    pub geometry: FrameGeometry,
}

/// Runs decoder, adaptive threshold, Soft-NMS and tracker in order, one frame
/// at a time.
///
/// Every stage but the tracker is a pure function of its input. `&mut self`
/// keeps cycles from overlapping.
#[derive(Debug)]
pub struct DetectionPipeline {
    decoder: TensorDecoder,
    threshold: AdaptiveThreshold,
    soft_nms: SoftNms,
    tracker: TemporalTracker,
}

impl DetectionPipeline {
    /// Create a pipeline after validating `config`.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let PipelineConfig {
            decoder,
            threshold,
            soft_nms,
            tracker,
        } = config;
        let soft_nms = SoftNms::new(soft_nms, threshold.base);
        Ok(Self {
            decoder: TensorDecoder::new(decoder),
            threshold: AdaptiveThreshold::new(threshold),
            soft_nms,
            tracker: TemporalTracker::new(tracker),
        })
    }

    /// Create a pipeline with default configuration.
    pub fn with_default_config() -> Self {
        let config = PipelineConfig::default();
        let soft_nms = SoftNms::new(config.soft_nms, config.threshold.base);
        Self {
            decoder: TensorDecoder::new(config.decoder),
            threshold: AdaptiveThreshold::new(config.threshold),
            soft_nms,
            tracker: TemporalTracker::new(config.tracker),
        }
    }

    /// Process one frame of detector output.
    ///
    /// Malformed output yields an empty result. An error is returned only when
    /// decoding could not allocate; tracker state is untouched in that case
    /// and the caller should move on to the next frame.
    pub fn process(
        &mut self,
        output: &RawOutput<'_>,
        frame: &FrameGeometry,
    ) -> Result<FrameResult> {
        let started = Instant::now();
        let candidates = self.decoder.decode(output, frame)?;
        let decoded = started.elapsed();

        // No raw detections: clear at once instead of letting tracks fade.
        if candidates.is_empty() {
            self.tracker.reset();
            return Ok(FrameResult::default());
        }

        // Candidates filtered away still age tracks through the normal budget.
        let filtered = self.threshold.apply(candidates);
        let suppressed = self.soft_nms.suppress(filtered);
        let detections = self.tracker.associate(&suppressed);
        let result = FrameResult::new(detections, self.tracker.stats());

        trace!(
            decode_us = decoded.as_micros() as u64,
            total_us = started.elapsed().as_micros() as u64,
            emitted = result.detections.len(),
            "processed frame"
        );
        Ok(result)
    }

    /// Normalize an arbitrary output representation, then [`process`](Self::process) it.
    ///
    /// Output that cannot be normalized counts as a frame with no detections.
    pub fn process_tensor<T: IntoRawTensor>(
        &mut self,
        tensor: T,
        frame: &FrameGeometry,
    ) -> Result<FrameResult> {
        match tensor.into_raw_tensor() {
            Ok(tensor) => self.process(&tensor.as_raw(), frame),
            Err(Error::MalformedTensor(reason)) => {
                warn!(%reason, "malformed detector output, skipping frame");
                self.tracker.reset();
                Ok(FrameResult::default())
            }
            Err(err) => Err(err),
        }
    }

    /// Drain frames from `frames` until the publisher goes away, handing each
    /// result to `sink`. Frames that fail are skipped. Returns the number of
    /// frames processed.
    pub fn run<F>(&mut self, frames: &FrameReceiver<FrameInput>, mut sink: F) -> usize
    where
        F: FnMut(FrameResult),
    {
        let mut processed = 0;
        while let Some(input) = frames.recv() {
            match self.process(&input.tensor.as_raw(), &input.geometry) {
                Ok(result) => {
                    processed += 1;
                    sink(result);
                }
                Err(err) => warn!(%err, "frame skipped"),
            }
        }
        processed
    }

    /// Get a reference to the decoder.
    pub fn decoder(&self) -> &TensorDecoder {
        &self.decoder
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &TemporalTracker {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut TemporalTracker {
        &mut self.tracker
    }
}

impl Default for DetectionPipeline {
    fn default() -> Self {
        Self::with_default_config()
    }
}
