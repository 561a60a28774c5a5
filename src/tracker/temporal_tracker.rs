//! Temporal tracker: frame-to-frame association, smoothing and flicker
//! suppression.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detection::{BoundingBox, Detection};
use crate::tracker::matching::{self, AssignmentResult};
use crate::tracker::track::{Track, TrackId};

/// Configuration for the [`TemporalTracker`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum IoU between a track and a same-class detection to match.
    pub match_iou: f32,
    /// Weight of the new box in the exponential moving average.
    pub smoothing_alpha: f32,
    /// A track is dropped once it has gone unmatched for more frames than this.
    /// With 1, a confirmed track coasts (and is emitted) for one missed frame;
    /// 0 drops a track the first frame it is not re-matched.
    pub max_missing_frames: u32,
    /// Raw detections kept per track.
    pub history_len: usize,
    /// Consecutive matches before a track is emitted.
    pub min_confirmed_frames: u32,
    /// Clear every track when [`TemporalTracker::update`] receives an empty
    /// frame. [`TemporalTracker::associate`] never resets.
    pub reset_on_empty: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            match_iou: 0.35,
            smoothing_alpha: 0.85,
            max_missing_frames: 1,
            history_len: 2,
            min_confirmed_frames: 2,
            reset_on_empty: true,
        }
    }
}

/// Diagnostics over the tracks emitted by the last update.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TrackerStats {
    pub active_tracks: usize,
    pub average_confidence: f32,
}

/// Turns per-frame detection lists into stable, smoothed output.
///
/// Tracks live in an arena keyed by id; ids grow monotonically and are never
/// reused by the same tracker. Not safe for overlapping updates: callers drive
/// one update per frame, in order.
#[derive(Debug)]
pub struct TemporalTracker {
    tracks: BTreeMap<TrackId, Track>,
    removed: Vec<Track>,
    next_id: TrackId,
    frame_id: u64,
    config: TrackerConfig,
}

impl TemporalTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            tracks: BTreeMap::new(),
            removed: Vec::new(),
            next_id: 1,
            frame_id: 0,
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of updates processed so far.
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    /// All live tracks, confirmed or not, in creation order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn track(&self, track_id: TrackId) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// Tracks dropped by the most recent update or reset, in the
    /// [`TrackState::Removed`](crate::tracker::TrackState::Removed) state.
    pub fn removed_tracks(&self) -> &[Track] {
        &self.removed
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Drop every track. Ids keep increasing afterwards.
    pub fn reset(&mut self) {
        if !self.tracks.is_empty() {
            debug!(cleared = self.tracks.len(), "tracker reset");
        }
        self.removed.clear();
        let tracks = std::mem::take(&mut self.tracks);
        for (_, mut track) in tracks {
            track.mark_removed();
            self.removed.push(track);
        }
    }

    /// Feed one frame of raw detections and return the smoothed detections of
    /// every confirmed track, in creation order.
    ///
    /// An empty frame clears every track when `reset_on_empty` is set.
    pub fn update(&mut self, detections: &[Detection]) -> Vec<Detection> {
        if detections.is_empty() && self.config.reset_on_empty {
            self.frame_id += 1;
            self.reset();
            return Vec::new();
        }
        self.associate(detections)
    }

    /// Run one association step without the empty-frame reset.
    ///
    /// An empty slice ages every track, so tracks coast within the
    /// missing-frame budget. Used when the frame had raw detections but none
    /// survived filtering.
    pub fn associate(&mut self, detections: &[Detection]) -> Vec<Detection> {
        self.frame_id += 1;
        self.removed.clear();

        // Step 1: Age every existing track
        for track in self.tracks.values_mut() {
            track.mark_missed();
        }

        // Step 2: Class-scoped greedy association
        let ids: Vec<TrackId> = self.tracks.keys().copied().collect();
        let track_boxes: Vec<(BoundingBox, usize)> = self
            .tracks
            .values()
            .map(|t| (*t.detection().bbox(), t.class_index()))
            .collect();
        let ious = matching::class_iou(&track_boxes, detections);

        let AssignmentResult {
            matches,
            unmatched_detections,
            ..
        } = matching::greedy_assignment(&ious, self.config.match_iou);

        // Step 3: Smooth matched tracks
        for (itrack, idet) in matches {
            if let Some(track) = self.tracks.get_mut(&ids[itrack]) {
                track.update(
                    detections[idet],
                    self.config.smoothing_alpha,
                    self.config.min_confirmed_frames,
                );
            }
        }

        // Step 4: Spawn tracks for unmatched detections
        for idet in unmatched_detections {
            self.create_track(detections[idet]);
        }

        // Step 5: Drop tracks past the missing-frame budget
        self.remove_stale();

        // Step 6: Emit confirmed tracks
        self.confirmed().map(|t| *t.detection()).collect()
    }

    /// Track count and mean confidence of the tracks currently emitted.
    pub fn stats(&self) -> TrackerStats {
        let (count, sum) = self
            .confirmed()
            .fold((0usize, 0.0f32), |(n, s), t| (n + 1, s + t.detection().confidence()));
        TrackerStats {
            active_tracks: count,
            average_confidence: if count > 0 { sum / count as f32 } else { 0.0 },
        }
    }

    fn confirmed(&self) -> impl Iterator<Item = &Track> {
        let min_confirmed = self.config.min_confirmed_frames;
        self.tracks
            .values()
            .filter(move |t| t.consecutive_matched_frames() >= min_confirmed)
    }

    fn create_track(&mut self, detection: Detection) -> TrackId {
        let track_id = self.next_id;
        self.next_id += 1;
        debug!(
            track_id,
            class = detection.class_name(),
            confidence = detection.confidence(),
            "spawned track"
        );
        self.tracks
            .insert(track_id, Track::new(track_id, detection, self.config.history_len));
        track_id
    }

    fn remove_stale(&mut self) {
        let budget = self.config.max_missing_frames;
        let stale: Vec<TrackId> = self
            .tracks
            .iter()
            .filter(|(_, track)| track.frames_since_last_match() > budget)
            .map(|(&track_id, _)| track_id)
            .collect();
        for track_id in stale {
            if let Some(mut track) = self.tracks.remove(&track_id) {
                track.mark_removed();
                debug!(
                    track_id,
                    matched_frames = track.consecutive_matched_frames(),
                    "dropped track"
                );
                self.removed.push(track);
            }
        }
    }
}

impl Default for TemporalTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}
