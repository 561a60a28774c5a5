//! Gaussian Soft-NMS over same-class candidates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detection::Detection;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftNmsConfig {
    /// Width of the Gaussian penalty `exp(-iou^2 / sigma)`.
    pub sigma: f32,
    /// Candidates decayed below this score are dropped from the pool.
    pub score_floor: f32,
    /// Fraction of the base confidence threshold a candidate must keep to be
    /// accepted.
    pub accept_ratio: f32,
}

impl Default for SoftNmsConfig {
    fn default() -> Self {
        Self {
            sigma: 0.5,
            score_floor: 0.01,
            accept_ratio: 0.5,
        }
    }
}

/// Collapses overlapping same-class candidates by decaying their scores
/// instead of discarding them outright.
#[derive(Debug, Clone)]
pub struct SoftNms {
    config: SoftNmsConfig,
    accept_threshold: f32,
}

impl SoftNms {
    /// `base_threshold` is the normal-scene confidence cutoff.
    pub fn new(config: SoftNmsConfig, base_threshold: f32) -> Self {
        let accept_threshold = base_threshold * config.accept_ratio;
        Self {
            config,
            accept_threshold,
        }
    }

    pub fn accept_threshold(&self) -> f32 {
        self.accept_threshold
    }

    /// Run suppression. Accepted detections carry their decayed score and are
    /// returned in acceptance order (decreasing score).
    pub fn suppress(&self, candidates: Vec<Detection>) -> Vec<Detection> {
        let before = candidates.len();
        let mut pool: Vec<(Detection, f32)> = candidates
            .into_iter()
            .map(|d| (d, d.confidence()))
            .collect();
        let mut kept = Vec::with_capacity(pool.len());

        while let Some(best_idx) = argmax(&pool) {
            let (best, score) = pool.swap_remove(best_idx);
            if score < self.accept_threshold {
                break;
            }
            kept.push(best.with_confidence(score));

            for (det, s) in pool.iter_mut() {
                if det.class_index() != best.class_index() {
                    continue;
                }
                let iou = best.bbox().iou(det.bbox());
                *s *= (-(iou * iou) / self.config.sigma).exp();
            }
            pool.retain(|(_, s)| *s >= self.config.score_floor);
        }

        debug!(before, after = kept.len(), "soft-nms suppression");
        kept
    }
}

/// Index of the highest current score; earlier entries win ties.
fn argmax(pool: &[(Detection, f32)]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &(_, s)) in pool.iter().enumerate() {
        match best {
            Some((_, top)) if s <= top => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::BoundingBox;

    fn det(l: f32, t: f32, r: f32, b: f32, class: usize, score: f32) -> Detection {
        Detection::new(BoundingBox::from_ltrb(l, t, r, b).unwrap(), class, score)
    }

    fn nms() -> SoftNms {
        SoftNms::new(SoftNmsConfig::default(), 0.35)
    }

    #[test]
    fn test_disjoint_boxes_untouched() {
        let a = det(0.0, 0.0, 50.0, 50.0, 0, 0.9);
        let b = det(100.0, 100.0, 150.0, 150.0, 0, 0.8);
        let kept = nms().suppress(vec![a, b]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0], a);
        assert_eq!(kept[1], b);
    }

    #[test]
    fn test_identical_boxes_collapse() {
        let a = det(0.0, 0.0, 50.0, 50.0, 0, 0.8);
        let b = det(0.0, 0.0, 50.0, 50.0, 0, 0.9);
        let kept = nms().suppress(vec![a, b]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].confidence(), 0.9);
        // Penalized score 0.8 * exp(-2) is under the acceptance bound.
        assert!(0.8 * (-2.0f32).exp() < nms().accept_threshold());
    }

    #[test]
    fn test_other_classes_unaffected() {
        let a = det(0.0, 0.0, 50.0, 50.0, 0, 0.9);
        let b = det(0.0, 0.0, 50.0, 50.0, 1, 0.6);
        let kept = nms().suppress(vec![a, b]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].confidence(), 0.6);
    }

    #[test]
    fn test_partial_overlap_decays() {
        // IoU = 25 / 175
        let a = det(0.0, 0.0, 10.0, 10.0, 0, 0.9);
        let b = det(5.0, 5.0, 15.0, 15.0, 0, 0.8);
        let kept = nms().suppress(vec![a, b]);
        assert_eq!(kept.len(), 2);
        let iou = 25.0f32 / 175.0;
        let expected = 0.8 * (-(iou * iou) / 0.5).exp();
        assert!((kept[1].confidence() - expected).abs() < 1e-6);
        assert!(kept[1].confidence() < 0.8);
    }

    #[test]
    fn test_below_accept_threshold_discarded() {
        let a = det(0.0, 0.0, 10.0, 10.0, 0, 0.1);
        assert!(nms().suppress(vec![a]).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(nms().suppress(Vec::new()).is_empty());
    }
}
