//! Single persistent track owned by the temporal tracker.

use std::collections::VecDeque;

use crate::detection::{BoundingBox, Detection};
use crate::tracker::track_state::TrackState;

/// Identifier of a track, unique for the lifetime of its tracker.
pub type TrackId = u64;

/// One object followed across frames.
///
/// The class is fixed at creation; a detection of another class always
/// starts a new track.
#[derive(Debug, Clone)]
pub struct Track {
    track_id: TrackId,
    state: TrackState,
    /// Latest smoothed detection
    detection: Detection,
    frames_since_last_match: u32,
    consecutive_matched_frames: u32,
    /// Last raw detections, oldest first
    history: VecDeque<Detection>,
    history_len: usize,
}

impl Track {
    pub(crate) fn new(track_id: TrackId, detection: Detection, history_len: usize) -> Self {
        let history_len = history_len.max(1);
        let mut history = VecDeque::with_capacity(history_len);
        history.push_back(detection);
        Self {
            track_id,
            state: TrackState::Created,
            detection,
            frames_since_last_match: 0,
            consecutive_matched_frames: 1,
            history,
            history_len,
        }
    }

    #[inline]
    pub fn track_id(&self) -> TrackId {
        self.track_id
    }

    #[inline]
    pub fn state(&self) -> TrackState {
        self.state
    }

    /// Current smoothed detection.
    #[inline]
    pub fn detection(&self) -> &Detection {
        &self.detection
    }

    #[inline]
    pub fn class_index(&self) -> usize {
        self.detection.class_index()
    }

    #[inline]
    pub fn frames_since_last_match(&self) -> u32 {
        self.frames_since_last_match
    }

    #[inline]
    pub fn consecutive_matched_frames(&self) -> u32 {
        self.consecutive_matched_frames
    }

    /// Raw detections most recently matched to this track, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Detection> {
        self.history.iter()
    }

    /// Age the track by one frame.
    pub(crate) fn mark_missed(&mut self) {
        self.frames_since_last_match += 1;
    }

    pub(crate) fn mark_removed(&mut self) {
        self.state = TrackState::Removed;
    }

    /// Absorb a matched detection.
    ///
    /// Geometry is blended as `alpha * new + (1 - alpha) * old` on each edge;
    /// class and confidence are taken from `det` unchanged.
    pub(crate) fn update(&mut self, det: Detection, alpha: f32, min_confirmed: u32) {
        debug_assert_eq!(det.class_index(), self.class_index());

        if self.history.len() == self.history_len {
            self.history.pop_front();
        }
        self.history.push_back(det);

        let old = self.detection.bbox().to_vector();
        let new = det.bbox().to_vector();
        let blended = old.lerp(&new, alpha);
        let bbox = BoundingBox::from_vector(&blended).unwrap_or(*det.bbox());

        self.detection = det.with_bbox(bbox);
        self.frames_since_last_match = 0;
        self.consecutive_matched_frames += 1;
        if self.consecutive_matched_frames >= min_confirmed {
            self.state = TrackState::Active;
        }
    }
}
