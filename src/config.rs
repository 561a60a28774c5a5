//! Pipeline-wide configuration.

use serde::{Deserialize, Serialize};

use crate::decoder::DecoderConfig;
use crate::error::{Error, Result};
use crate::postprocess::{SoftNmsConfig, ThresholdConfig};
use crate::tracker::TrackerConfig;

/// Tunable constants of every stage, loadable from JSON.
///
/// Missing sections and fields fall back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub decoder: DecoderConfig,
    pub threshold: ThresholdConfig,
    pub soft_nms: SoftNmsConfig,
    pub tracker: TrackerConfig,
}

impl PipelineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        let d = &self.decoder;
        let t = &self.threshold;
        let n = &self.soft_nms;
        let k = &self.tracker;

        let ordered = d.score_floor <= t.low && t.low <= t.base && t.base <= t.high;
        if !ordered {
            return Err(invalid(format!(
                "thresholds must satisfy score_floor <= low <= base <= high, got {} / {} / {} / {}",
                d.score_floor, t.low, t.base, t.high
            )));
        }
        if !(0.0..=1.0).contains(&d.score_floor) || !(0.0..=1.0).contains(&t.high) {
            return Err(invalid("confidence thresholds must lie in [0, 1]".to_string()));
        }
        if d.min_box_size.is_nan() || d.min_box_size < 0.0 {
            return Err(invalid(format!("min_box_size must be >= 0, got {}", d.min_box_size)));
        }
        if d.model_input_size == 0 {
            return Err(invalid("model_input_size must be positive".to_string()));
        }
        if n.sigma.is_nan() || n.sigma <= 0.0 {
            return Err(invalid(format!("soft-nms sigma must be > 0, got {}", n.sigma)));
        }
        let negative = |v: f32| v.is_nan() || v < 0.0;
        if negative(n.score_floor) || negative(n.accept_ratio) {
            return Err(invalid("soft-nms floor and accept ratio must be >= 0".to_string()));
        }
        if k.smoothing_alpha.is_nan() || k.smoothing_alpha <= 0.0 || k.smoothing_alpha > 1.0 {
            return Err(invalid(format!(
                "smoothing_alpha must lie in (0, 1], got {}",
                k.smoothing_alpha
            )));
        }
        if !(0.0..=1.0).contains(&k.match_iou) {
            return Err(invalid(format!("match_iou must lie in [0, 1], got {}", k.match_iou)));
        }
        if k.history_len == 0 {
            return Err(invalid("history_len must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> Error {
    Error::InvalidConfig(msg)
}
