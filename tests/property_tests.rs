use proptest::prelude::*;
use stabletrack_rs::{
    BoundingBox, Detection, SoftNms, SoftNmsConfig, TemporalTracker, TrackerConfig,
};

fn bbox_strategy() -> impl Strategy<Value = BoundingBox> {
    (0.0f32..600.0, 0.0f32..600.0, 1.0f32..200.0, 1.0f32..200.0)
        .prop_map(|(l, t, w, h)| BoundingBox::from_tlwh(l, t, w, h).unwrap())
}

fn detection_strategy() -> impl Strategy<Value = Detection> {
    (bbox_strategy(), 0usize..3, 0.0f32..=1.0).prop_map(|(b, c, s)| Detection::new(b, c, s))
}

proptest! {
    #[test]
    fn test_iou_bounded_and_symmetric(a in bbox_strategy(), b in bbox_strategy()) {
        let ab = a.iou(&b);
        let ba = b.iou(&a);
        prop_assert!((0.0..=1.0 + 1e-6).contains(&ab));
        prop_assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn test_soft_nms_output_invariants(dets in prop::collection::vec(detection_strategy(), 0..40)) {
        let nms = SoftNms::new(SoftNmsConfig::default(), 0.35);
        let kept = nms.suppress(dets.clone());

        prop_assert!(kept.len() <= dets.len());
        for pair in kept.windows(2) {
            prop_assert!(pair[0].confidence() >= pair[1].confidence());
        }
        for d in &kept {
            prop_assert!(d.confidence() >= nms.accept_threshold());
            // Scores only ever decay.
            prop_assert!(dets.iter().any(|o| o.bbox() == d.bbox()
                && o.class_index() == d.class_index()
                && o.confidence() >= d.confidence()));
        }
    }

    #[test]
    fn test_tracker_emits_valid_boxes(frames in prop::collection::vec(
        prop::collection::vec(detection_strategy(), 0..8), 1..12)
    ) {
        let mut tracker = TemporalTracker::new(TrackerConfig::default());
        for frame in &frames {
            let out = tracker.update(frame);
            prop_assert!(out.len() <= tracker.len());
            for d in &out {
                let b = d.bbox();
                prop_assert!(b.right() > b.left());
                prop_assert!(b.bottom() > b.top());
            }
            for track in tracker.tracks() {
                prop_assert!(track.consecutive_matched_frames() >= 1);
                prop_assert!(track.frames_since_last_match() <= 1);
                prop_assert!(track.history().count() <= 2);
            }
        }
    }
}
