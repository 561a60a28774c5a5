use stabletrack_rs::{BoundingBox, Detection, TemporalTracker, TrackState, TrackerConfig};

fn det(l: f32, t: f32, r: f32, b: f32, class: usize, score: f32) -> Detection {
    Detection::new(BoundingBox::from_ltrb(l, t, r, b).unwrap(), class, score)
}

#[test]
fn test_stable_detection_confirmed_from_second_frame() {
    let mut tracker = TemporalTracker::new(TrackerConfig::default());
    let person = det(100.0, 100.0, 200.0, 300.0, 0, 0.9);

    // Frame 1: new track, not emitted yet
    let out1 = tracker.update(&[person]);
    assert!(out1.is_empty());

    // Frame 2: confirmed
    let out2 = tracker.update(&[person]);
    assert_eq!(out2.len(), 1);
    assert_eq!(out2[0].bbox(), person.bbox());

    // Frame 3: still the same track
    let out3 = tracker.update(&[person]);
    assert_eq!(out3.len(), 1);

    let tracks: Vec<_> = tracker.tracks().collect();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].consecutive_matched_frames(), 3);
    assert_eq!(tracks[0].state(), TrackState::Active);
}

#[test]
fn test_single_frame_flicker_never_emitted() {
    let mut tracker = TemporalTracker::new(TrackerConfig::default());
    let anchor = det(400.0, 400.0, 500.0, 500.0, 2, 0.9);
    let blip = det(10.0, 10.0, 60.0, 60.0, 0, 0.8);

    let mut emitted = Vec::new();
    emitted.extend(tracker.update(&[anchor, blip]));
    emitted.extend(tracker.update(&[anchor]));
    emitted.extend(tracker.update(&[anchor]));
    emitted.extend(tracker.update(&[anchor]));

    assert!(emitted.iter().all(|d| d.class_index() == 2));
    assert!(tracker.tracks().all(|t| t.class_index() == 2));
}

#[test]
fn test_class_change_spawns_new_track() {
    let mut tracker = TemporalTracker::new(TrackerConfig::default());
    tracker.update(&[det(100.0, 100.0, 200.0, 200.0, 15, 0.9)]);
    tracker.update(&[det(100.0, 100.0, 200.0, 200.0, 15, 0.9)]);

    // Same place, reported as a dog instead of a cat.
    let out = tracker.update(&[det(102.0, 100.0, 202.0, 200.0, 16, 0.9)]);

    let tracks: Vec<_> = tracker.tracks().collect();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].class_index(), 15);
    assert_eq!(tracks[0].frames_since_last_match(), 1);
    assert_eq!(tracks[1].class_index(), 16);
    assert_eq!(tracks[1].consecutive_matched_frames(), 1);
    assert_ne!(tracks[0].track_id(), tracks[1].track_id());

    // The new dog track is not confirmed yet; the cat coasts one frame.
    assert!(out.iter().all(|d| d.class_index() == 15));
}

#[test]
fn test_empty_frame_resets_tracks() {
    let mut tracker = TemporalTracker::new(TrackerConfig::default());
    let person = det(100.0, 100.0, 200.0, 300.0, 0, 0.9);
    tracker.update(&[person]);
    tracker.update(&[person]);
    let first_id = tracker.tracks().next().unwrap().track_id();

    // Frame with zero detections
    assert!(tracker.update(&[]).is_empty());
    assert!(tracker.is_empty());

    // Reappearing object is a brand-new track
    let out = tracker.update(&[person]);
    assert!(out.is_empty());
    let track = tracker.tracks().next().unwrap();
    assert_eq!(track.consecutive_matched_frames(), 1);
    assert_ne!(track.track_id(), first_id);
}

#[test]
fn test_smoothing_follows_motion() {
    let mut tracker = TemporalTracker::new(TrackerConfig::default());
    tracker.update(&[det(0.0, 0.0, 100.0, 100.0, 0, 0.9)]);
    let out = tracker.update(&[det(10.0, 0.0, 110.0, 100.0, 0, 0.7)]);

    // 0.85 * new + 0.15 * old
    let [l, t, r, b] = out[0].bbox().to_ltrb();
    assert!((l - 8.5).abs() < 1e-4);
    assert!((t - 0.0).abs() < 1e-4);
    assert!((r - 108.5).abs() < 1e-4);
    assert!((b - 100.0).abs() < 1e-4);
    assert_eq!(out[0].confidence(), 0.7);
}

#[test]
fn test_low_overlap_does_not_match() {
    let mut tracker = TemporalTracker::new(TrackerConfig::default());
    tracker.update(&[det(0.0, 0.0, 100.0, 100.0, 0, 0.9)]);
    // IoU with the previous box is 0.25, under the 0.35 match threshold.
    tracker.update(&[det(60.0, 0.0, 160.0, 100.0, 0, 0.9)]);
    let ids: Vec<_> = tracker.tracks().map(|t| t.track_id()).collect();
    assert_eq!(ids.len(), 2);
    assert!(tracker.tracks().all(|t| t.consecutive_matched_frames() == 1));
}
