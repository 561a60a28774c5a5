//! Scene-density adaptive confidence threshold.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detection::Detection;

/// Confidence cutoffs and the candidate counts that select between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Cutoff for sparse scenes.
    pub low: f32,
    /// Cutoff for normal scenes. Also anchors the Soft-NMS acceptance bound.
    pub base: f32,
    /// Cutoff for crowded scenes.
    pub high: f32,
    /// More candidates than this is a crowded scene.
    pub crowded_above: usize,
    /// Fewer candidates than this is a sparse scene.
    pub sparse_below: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            low: 0.25,
            base: 0.35,
            high: 0.50,
            crowded_above: 15,
            sparse_below: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneDensity {
    Sparse,
    Normal,
    Crowded,
}

/// Picks a confidence cutoff from the number of preliminary candidates.
#[derive(Debug, Clone, Default)]
pub struct AdaptiveThreshold {
    config: ThresholdConfig,
}

impl AdaptiveThreshold {
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    pub fn density(&self, candidates: usize) -> SceneDensity {
        if candidates > self.config.crowded_above {
            SceneDensity::Crowded
        } else if candidates < self.config.sparse_below {
            SceneDensity::Sparse
        } else {
            SceneDensity::Normal
        }
    }

    pub fn select(&self, candidates: usize) -> f32 {
        match self.density(candidates) {
            SceneDensity::Crowded => self.config.high,
            SceneDensity::Sparse => self.config.low,
            SceneDensity::Normal => self.config.base,
        }
    }

    /// Keep the candidates whose confidence reaches the selected cutoff.
    pub fn apply(&self, mut candidates: Vec<Detection>) -> Vec<Detection> {
        let count = candidates.len();
        let threshold = self.select(count);
        candidates.retain(|d| d.confidence() >= threshold);
        debug!(
            density = ?self.density(count),
            threshold,
            before = count,
            after = candidates.len(),
            "applied adaptive threshold"
        );
        candidates
    }
}
