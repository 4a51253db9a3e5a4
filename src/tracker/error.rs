use thiserror::Error;

/// Errors reported by [PitchTracker](super::PitchTracker).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerError {
    /// The caller asked for more samples than the block holds.
    #[error("Sample count {requested} exceeds the block length {available}")]
    SampleCountOutOfRange { requested: usize, available: usize },
}
