use crate::common::Autocorrelation;
use crate::mpm::key_maximum::KeyMaximum;
use crate::mpm::util::m_prime_incremental;

/// The maximum number of key maxima to gather during the peak finding phase.
pub const MAX_KEY_MAXIMA_COUNT: usize = 16;
/// Key maxima at or above this fraction of the largest key maximum
/// are candidates for the pitch period.
const KEY_MAXIMUM_CUTOFF: f32 = 0.9;
/// Default minimum clarity for a result to be considered a tone.
pub const DEFAULT_CLARITY_THRESHOLD: f32 = 0.8;
/// Default maximum drop in NSDF value from the pitch period to twice the pitch period.
pub const DEFAULT_CLARITY_TOLERANCE: f32 = 0.2;

/// A pitch detection result, along with the buffers used to compute it.
pub struct MpmPitchResult {
    /// The estimated pitch frequency in Hz, or 0 if no key maximum was found.
    pub frequency: f32,
    /// The value of the NSDF at the maximum corresponding to the pitch period.
    /// Values close to 1 indicate pure tones and values close to 0 indicate
    /// lack of a discernable pitch.
    pub clarity: f32,
    /// The value of the NSDF at twice the pitch period, or None if that lag
    /// is out of range.
    pub clarity_at_double_period: Option<f32>,
    /// The estimated pitch period in samples.
    pub pitch_period: f32,
    /// The window to analyze.
    pub window: Box<[f32]>,
    /// The normalized square difference function.
    pub nsdf: Box<[f32]>,
    /// The number of key maxima found during the peak picking phase.
    pub key_max_count: usize,
    /// The first `key_max_count` entries are valid.
    pub key_maxima: [KeyMaximum; MAX_KEY_MAXIMA_COUNT],
    /// The index into `key_maxima` of the selected key maximum.
    pub selected_key_max_index: usize,
    autocorr: Autocorrelation,
    r_prime: Box<[f32]>,
}

impl MpmPitchResult {
    pub fn new(window_size: usize, lag_count: usize) -> Self {
        MpmPitchResult {
            frequency: 0.0,
            clarity: 0.0,
            clarity_at_double_period: None,
            pitch_period: 0.0,
            window: vec![0.0; window_size].into_boxed_slice(),
            nsdf: vec![0.0; lag_count].into_boxed_slice(),
            key_max_count: 0,
            key_maxima: [KeyMaximum::new(); MAX_KEY_MAXIMA_COUNT],
            selected_key_max_index: 0,
            autocorr: Autocorrelation::new(window_size, lag_count),
            r_prime: vec![0.0; lag_count].into_boxed_slice(),
        }
    }

    /// Performs pitch detection on the current contents of `window`.
    pub fn compute(&mut self, sample_rate: f32) {
        self.reset();
        self.compute_nsdf();
        self.perform_peak_picking();
        self.compute_pitch(sample_rate);
    }

    /// Indicates if a key maximum was found.
    pub fn is_valid(&self) -> bool {
        self.key_max_count > 0
    }

    /// Indicates if the analyzed window has a discernable fundamental frequency,
    /// using the default thresholds.
    pub fn is_tone(&self) -> bool {
        self.is_tone_with_options(DEFAULT_CLARITY_THRESHOLD, DEFAULT_CLARITY_TOLERANCE)
    }

    /// A clear NSDF peak at the pitch period is not enough, since noise may
    /// produce isolated peaks. A periodic signal also has a peak of similar
    /// height at twice the period, if that lag is within range.
    pub fn is_tone_with_options(&self, clarity_threshold: f32, clarity_tolerance: f32) -> bool {
        if !self.is_valid() || self.clarity < clarity_threshold {
            return false;
        }
        match self.clarity_at_double_period {
            Some(value) => value >= self.clarity - clarity_tolerance,
            None => true,
        }
    }

    fn reset(&mut self) {
        self.frequency = 0.0;
        self.clarity = 0.0;
        self.clarity_at_double_period = None;
        self.pitch_period = 0.0;
        self.key_max_count = 0;
        self.selected_key_max_index = 0;
    }

    /// Computes the NSDF as 2 * r' / m'.
    fn compute_nsdf(&mut self) {
        if self.r_prime.is_empty() {
            return;
        }
        self.autocorr.compute(&self.window, &mut self.r_prime);
        m_prime_incremental(&self.window, self.r_prime[0], &mut self.nsdf);
        for (nsdf, r) in self.nsdf.iter_mut().zip(self.r_prime.iter()) {
            let m = *nsdf;
            *nsdf = if m.abs() <= f32::EPSILON { 0.0 } else { 2.0 * r / m };
        }
    }

    fn perform_peak_picking(&mut self) {
        let nsdf = &self.nsdf[..];
        if nsdf.len() < 2 {
            return;
        }

        // Gather the highest maximum between each positive zero crossing
        // and the following negative zero crossing (or the last lag).
        let mut is_detecting = false;
        let mut maximum_value: f32 = 0.0;
        let mut maximum_index: usize = 0;
        let mut prev = nsdf[0];
        for (i, &curr) in nsdf.iter().enumerate().skip(1) {
            if prev <= 0.0 && curr > 0.0 {
                is_detecting = true;
                maximum_value = curr;
                maximum_index = i;
            } else if prev >= 0.0 && curr < 0.0 {
                if is_detecting && self.key_max_count < MAX_KEY_MAXIMA_COUNT {
                    self.key_maxima[self.key_max_count].set(nsdf, maximum_index);
                    self.key_max_count += 1
                }
                is_detecting = false;
            }

            if is_detecting {
                if curr > maximum_value {
                    maximum_value = curr;
                    maximum_index = i;
                }
                if i == nsdf.len() - 1 && self.key_max_count < MAX_KEY_MAXIMA_COUNT {
                    self.key_maxima[self.key_max_count].set(nsdf, maximum_index);
                    self.key_max_count += 1
                }
            }

            prev = curr;
        }

        if self.key_max_count == 0 {
            return;
        }

        // Select the first key maximum that is close enough to the largest one.
        let key_maxima = &self.key_maxima[..self.key_max_count];
        let largest = key_maxima
            .iter()
            .fold(f32::MIN, |max, key_max| max.max(key_max.value_at_lag_index));
        let threshold = KEY_MAXIMUM_CUTOFF * largest;
        self.selected_key_max_index = key_maxima
            .iter()
            .position(|key_max| key_max.value >= threshold)
            .unwrap_or(0);

        let double_period_lag_index = 2 * key_maxima[self.selected_key_max_index].lag_index;
        if double_period_lag_index < nsdf.len() {
            self.clarity_at_double_period = Some(nsdf[double_period_lag_index])
        }
    }

    fn compute_pitch(&mut self, sample_rate: f32) {
        if self.key_max_count == 0 {
            return;
        }
        let selected_max = self.key_maxima[self.selected_key_max_index];
        if selected_max.lag <= 0.0 {
            return;
        }
        self.pitch_period = selected_max.lag;
        self.clarity = selected_max.value.min(1.0);
        self.frequency = sample_rate / self.pitch_period;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_sine(window: &mut [f32], sample_rate: f32, frequency: f32) {
        for (i, value) in window.iter_mut().enumerate() {
            *value = (2.0 * core::f32::consts::PI * frequency * (i as f32) / sample_rate).sin();
        }
    }

    #[test]
    fn test_silence() {
        let mut result = MpmPitchResult::new(1024, 512);
        result.compute(44100.0);
        assert_eq!(result.nsdf[0], 0.);
        assert_eq!(result.key_max_count, 0);
        assert_eq!(result.frequency, 0.0);
        assert!(!result.is_tone());
    }

    #[test]
    fn test_sine_detection() {
        let sample_rate = 11025.0;
        for &f in [110.0_f32, 220.0, 467.0, 1200.0].iter() {
            let mut result = MpmPitchResult::new(512, 256);
            fill_sine(&mut result.window, sample_rate, f);
            result.compute(sample_rate);
            assert!(result.is_tone());
            assert!((f - result.frequency).abs() / f <= 0.005, "expected {}, got {}", f, result.frequency);
        }
    }

    #[test]
    fn test_low_sine() {
        // Expected pitch period > 0.5 * lag_count and < lag_count
        for &f in [154.0_f32, 190.0_f32].iter() {
            let window_size = 1024;
            let lag_count = window_size / 2;
            let sample_rate: f32 = 44100.0;
            assert!(sample_rate / f < (lag_count as f32));

            let mut result = MpmPitchResult::new(window_size, lag_count);
            fill_sine(&mut result.window, sample_rate, f);
            result.compute(sample_rate);

            assert!((f - result.frequency).abs() <= 0.05, "Wrong detected frequency");
            let last_max = result.key_maxima[result.key_max_count - 1];
            assert!((last_max.lag - (last_max.lag_index as f32)).abs() < 1., "Unreasonable interpolated key max lag");
        }
    }

    #[test]
    fn test_harmonics_do_not_cause_octave_errors() {
        let sample_rate = 11025.0;
        let f = 180.0_f32;
        let mut result = MpmPitchResult::new(512, 256);
        for (i, value) in result.window.iter_mut().enumerate() {
            let t = 2.0 * core::f32::consts::PI * f * (i as f32) / sample_rate;
            *value = 0.4 * t.sin() + 0.6 * (2.0 * t).sin() + 0.3 * (3.0 * t).sin();
        }
        result.compute(sample_rate);
        assert!((f - result.frequency).abs() / f <= 0.01, "got {}", result.frequency);
    }
}
