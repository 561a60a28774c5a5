mod matching;
mod temporal_tracker;
mod track;
mod track_state;

pub use matching::{AssignmentResult, class_iou, greedy_assignment};
pub use temporal_tracker::{TemporalTracker, TrackerConfig, TrackerStats};
pub use track::{Track, TrackId};
pub use track_state::TrackState;
