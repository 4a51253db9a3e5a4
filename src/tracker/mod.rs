//! Streaming pitch tracking.
//!
//! [PitchTracker] consumes mono audio blocks of any size and emits a
//! [PitchRecord] at a fixed rate. The pitch of each block is estimated by a
//! [PeriodicityEstimator], which defaults to [MpmEstimator](crate::mpm::MpmEstimator).

mod config;
mod error;
mod estimator;
mod pitch_record;
mod pitch_tracker;

pub use config::{
    PitchTrackerConfig, DEFAULT_DETECT_LEVEL_THRESHOLD, DEFAULT_PITCH_RECORDS_PER_SECOND,
    DEFAULT_SAMPLE_RATE, MAX_DETECT_LEVEL_THRESHOLD, MAX_PITCH_RECORDS_PER_SECOND,
    MAX_RECORD_HISTORY_SIZE, MIN_DETECT_LEVEL_THRESHOLD, MIN_PITCH_RECORDS_PER_SECOND,
};
pub use error::TrackerError;
pub use estimator::{EstimatorConfig, PeriodicityEstimator};
pub use pitch_record::PitchRecord;
pub use pitch_tracker::{PitchTracker, MAX_FREQUENCY, MIN_FREQUENCY};
