/// Default sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;
/// Default detect level threshold.
pub const DEFAULT_DETECT_LEVEL_THRESHOLD: f32 = 0.01;
/// Default number of pitch records per second.
pub const DEFAULT_PITCH_RECORDS_PER_SECOND: u32 = 50;
pub const MIN_DETECT_LEVEL_THRESHOLD: f32 = 0.0001;
pub const MAX_DETECT_LEVEL_THRESHOLD: f32 = 1.0;
pub const MIN_PITCH_RECORDS_PER_SECOND: u32 = 1;
pub const MAX_PITCH_RECORDS_PER_SECOND: u32 = 100;
/// Upper bound on the number of records kept in the history.
pub const MAX_RECORD_HISTORY_SIZE: usize = 100_000;

/// [PitchTracker](super::PitchTracker) settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PitchTrackerConfig {
    /// The input sample rate in Hz.
    pub sample_rate: f64,
    /// Input below this peak level is treated as silence.
    /// Clamped to `[MIN_DETECT_LEVEL_THRESHOLD, MAX_DETECT_LEVEL_THRESHOLD]`.
    pub detect_level_threshold: f32,
    /// Clamped to `[MIN_PITCH_RECORDS_PER_SECOND, MAX_PITCH_RECORDS_PER_SECOND]`.
    pub pitch_records_per_second: u32,
    /// The number of most recent records to keep. 0 disables the history.
    pub record_history_size: usize,
}

impl Default for PitchTrackerConfig {
    fn default() -> Self {
        PitchTrackerConfig {
            sample_rate: DEFAULT_SAMPLE_RATE,
            detect_level_threshold: DEFAULT_DETECT_LEVEL_THRESHOLD,
            pitch_records_per_second: DEFAULT_PITCH_RECORDS_PER_SECOND,
            record_history_size: 0,
        }
    }
}

pub(crate) fn clamp_detect_level_threshold(threshold: f32) -> f32 {
    if threshold.is_nan() {
        return DEFAULT_DETECT_LEVEL_THRESHOLD;
    }
    threshold.max(MIN_DETECT_LEVEL_THRESHOLD).min(MAX_DETECT_LEVEL_THRESHOLD)
}

pub(crate) fn clamp_pitch_records_per_second(records_per_second: u32) -> u32 {
    records_per_second.clamp(MIN_PITCH_RECORDS_PER_SECOND, MAX_PITCH_RECORDS_PER_SECOND)
}
