//! Class-scoped greedy IoU matching between tracks and detections.

use ndarray::Array2;

use crate::detection::{BoundingBox, Detection};

/// Marks a track/detection pair of different classes; never clears a threshold.
const CLASS_MISMATCH: f32 = -1.0;

/// Compute the IoU matrix between tracks and detections, with pairs of
/// different classes set below any valid IoU.
///
/// Rows are tracks, columns are detections.
pub fn class_iou(tracks: &[(BoundingBox, usize)], detections: &[Detection]) -> Array2<f32> {
    let mut ious = Array2::from_elem((tracks.len(), detections.len()), CLASS_MISMATCH);
    for (i, (bbox, class_index)) in tracks.iter().enumerate() {
        for (j, det) in detections.iter().enumerate() {
            if det.class_index() == *class_index {
                ious[[i, j]] = bbox.iou(det.bbox());
            }
        }
    }
    ious
}

#[derive(Debug, Clone)]
pub struct AssignmentResult {
    /// `(track, detection)` index pairs
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Assign detections to tracks in detection order.
///
/// Each detection takes the not-yet-matched track with the highest IoU at or
/// above `thresh`; ties go to the lower track index. A track is matched at
/// most once.
pub fn greedy_assignment(ious: &Array2<f32>, thresh: f32) -> AssignmentResult {
    let (num_tracks, num_dets) = ious.dim();
    let mut track_taken = vec![false; num_tracks];
    let mut matches = Vec::new();
    let mut unmatched_detections = Vec::new();

    for det in 0..num_dets {
        let mut best: Option<(usize, f32)> = None;
        for (track, &iou) in ious.column(det).iter().enumerate() {
            if track_taken[track] || iou < thresh {
                continue;
            }
            match best {
                Some((_, top)) if iou <= top => {}
                _ => best = Some((track, iou)),
            }
        }
        match best {
            Some((track, _)) => {
                track_taken[track] = true;
                matches.push((track, det));
            }
            None => unmatched_detections.push(det),
        }
    }

    let unmatched_tracks = track_taken
        .iter()
        .enumerate()
        .filter_map(|(i, &taken)| if taken { None } else { Some(i) })
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}
