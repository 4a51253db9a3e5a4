use crate::common::F32ArrayExt;
use crate::mpm::result::MpmPitchResult;
use crate::tracker::{EstimatorConfig, PeriodicityEstimator};

/// Band-limited windows are decimated to roughly this rate before analysis.
const TARGET_ANALYSIS_RATE: f64 = 11025.0;

/// Dual band MPM periodicity estimator.
///
/// Both bands are analyzed using the McLeod pitch method. The lo band, which
/// has most harmonics filtered out, is trusted for pitches up to the crossover
/// frequency where it is less prone to octave errors. Above that, the wide
/// hi band is used.
pub struct MpmEstimator {
    min_frequency: f32,
    max_frequency: f32,
    detect_level_threshold: f32,
    crossover_frequency: f32,
    window_size: usize,
    decimation: usize,
    analysis_rate: f32,
    lo: MpmPitchResult,
    hi: MpmPitchResult,
}

impl MpmEstimator {
    /// The factor by which input windows are decimated before analysis.
    pub fn decimation(&self) -> usize {
        self.decimation
    }

    /// The most recent lo band analysis.
    pub fn lo_band_result(&self) -> &MpmPitchResult {
        &self.lo
    }

    /// The most recent hi band analysis.
    pub fn hi_band_result(&self) -> &MpmPitchResult {
        &self.hi
    }

    fn accept(&self, frequency: f32) -> f32 {
        if frequency >= self.min_frequency && frequency <= self.max_frequency {
            frequency
        } else {
            0.0
        }
    }
}

fn decimate(source: &[f32], factor: usize, destination: &mut [f32]) {
    for (value, sample) in destination.iter_mut().zip(source.iter().step_by(factor)) {
        *value = *sample;
    }
}

impl PeriodicityEstimator for MpmEstimator {
    fn from_config(config: &EstimatorConfig) -> Self {
        let decimation = ((config.sample_rate / TARGET_ANALYSIS_RATE) as usize).max(1);
        let analysis_rate = config.sample_rate / (decimation as f64);
        let decimated_window_size = ((config.window_size + decimation - 1) / decimation).max(2);
        // Room for the longest period plus a couple of lags for interpolation.
        let max_period = (analysis_rate / (config.min_frequency as f64)).ceil() as usize;
        let lag_count = (max_period + 2).min(decimated_window_size);

        log::debug!(
            "MPM estimator: decimation {}, analysis window {} samples, {} lags",
            decimation,
            decimated_window_size,
            lag_count
        );

        MpmEstimator {
            min_frequency: config.min_frequency,
            max_frequency: config.max_frequency,
            detect_level_threshold: config.detect_level_threshold,
            crossover_frequency: config.crossover_frequency,
            window_size: config.window_size,
            decimation,
            analysis_rate: analysis_rate as f32,
            lo: MpmPitchResult::new(decimated_window_size, lag_count),
            hi: MpmPitchResult::new(decimated_window_size, lag_count),
        }
    }

    fn estimate(&mut self, lo_band: &[f32], hi_band: &[f32]) -> f32 {
        if lo_band.len() < self.window_size || hi_band.len() < self.window_size {
            return 0.0;
        }
        let lo_band = &lo_band[..self.window_size];
        let hi_band = &hi_band[..self.window_size];

        if hi_band.peak_level() < self.detect_level_threshold {
            return 0.0;
        }

        if lo_band.peak_level() >= self.detect_level_threshold {
            decimate(lo_band, self.decimation, &mut self.lo.window);
            self.lo.compute(self.analysis_rate);
            if self.lo.is_tone() && self.lo.frequency <= self.crossover_frequency {
                return self.accept(self.lo.frequency);
            }
        }

        decimate(hi_band, self.decimation, &mut self.hi.window);
        self.hi.compute(self.analysis_rate);
        if self.hi.is_tone() {
            return self.accept(self.hi.frequency);
        }
        0.0
    }
}
