/// Track state enumeration for the temporal tracker lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Newly spawned track, not yet emitted
    #[default]
    Created,
    /// Matched on enough consecutive frames to be emitted
    Active,
    /// Missing-frame budget exceeded, about to be dropped
    Removed,
}
