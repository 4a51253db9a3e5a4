/// Parameters a [PeriodicityEstimator] is created from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorConfig {
    /// Sample rate of the band-limited windows, in Hz.
    pub sample_rate: f64,
    /// The lowest frequency that may be reported, in Hz.
    pub min_frequency: f32,
    /// The highest frequency that may be reported, in Hz.
    pub max_frequency: f32,
    /// Windows with a peak level below this are considered silent.
    pub detect_level_threshold: f32,
    /// The number of samples of each band analyzed per estimate.
    pub window_size: usize,
    /// The low pass corner of the lo band, in Hz.
    pub crossover_frequency: f32,
}

/// Estimates the fundamental frequency of a signal, given a low frequency biased
/// (lo) and a wide band (hi) view of the same `window_size` samples.
///
/// Implementations must be deterministic and run in time bounded by the window
/// size. `estimate` returns 0 when the signal is below the detect threshold or
/// has no periodicity between the min and max frequency. Otherwise it returns
/// a frequency within that range. It never returns a negative value or NaN.
/// `&mut self` is only meant for reusing scratch memory between calls.
pub trait PeriodicityEstimator {
    fn from_config(config: &EstimatorConfig) -> Self
    where
        Self: Sized;

    /// `lo_band` and `hi_band` hold at least `window_size` samples. Only the
    /// first `window_size` samples are analyzed.
    fn estimate(&mut self, lo_band: &[f32], hi_band: &[f32]) -> f32;
}
