use std::collections::{vec_deque, VecDeque};

use crate::common::CircularBuffer;
use crate::iir::{FilterType, IirFilter};
use crate::mpm::MpmEstimator;
use crate::tracker::config::{
    clamp_detect_level_threshold, clamp_pitch_records_per_second, PitchTrackerConfig,
    DEFAULT_SAMPLE_RATE, MAX_RECORD_HISTORY_SIZE,
};
use crate::tracker::error::TrackerError;
use crate::tracker::estimator::{EstimatorConfig, PeriodicityEstimator};
use crate::tracker::pitch_record::PitchRecord;

/// The lowest detectable frequency in Hz.
pub const MIN_FREQUENCY: f32 = 50.0;
/// The highest detectable frequency in Hz.
pub const MAX_FREQUENCY: f32 = 1600.0;

const FILTER_ORDER: usize = 5;
const HIGH_PASS_CORNER: f64 = 45.0;
const LO_BAND_LOW_PASS_CORNER: f64 = 280.0;
const HI_BAND_LOW_PASS_CORNER: f64 = 1500.0;

/// Length of the trailing window shared by the two estimates of a pitch block.
const DETECT_OVERLAP_SEC: f64 = 0.005;
/// Maximum relative difference between the two estimates of a pitch block.
const MAX_OVERLAP_DIFF: f32 = 10.0 * 0.005;
const AVG_COUNT: usize = 1;
const AVG_OFFSET_SEC: f64 = 0.005;
const PITCH_WINDOW_SLACK_SAMPLES: usize = 16;
const BUFFER_HISTORY_SEC: f64 = 1.0;
const BUFFER_SLACK_SAMPLES: usize = 10000;

/// One of the two filtered views of the input.
struct Band {
    high_pass: IirFilter,
    low_pass: IirFilter,
    buffer: CircularBuffer,
    /// Scratch space for filtering input chunks.
    chunk: Box<[f32]>,
    /// The window currently being analyzed.
    window: Box<[f32]>,
}

impl Band {
    fn new(sample_rate: f64, low_pass_corner: f64) -> Self {
        Band {
            high_pass: IirFilter::new(FilterType::HighPass, FILTER_ORDER, sample_rate, HIGH_PASS_CORNER),
            low_pass: IirFilter::new(FilterType::LowPass, FILTER_ORDER, sample_rate, low_pass_corner),
            buffer: CircularBuffer::new(0),
            chunk: Box::new([]),
            window: Box::new([]),
        }
    }

    fn configure(&mut self, sample_rate: f64, buffer_capacity: usize, window_size: usize) {
        self.high_pass.set_sample_rate(sample_rate);
        self.low_pass.set_sample_rate(sample_rate);
        self.buffer = CircularBuffer::new(buffer_capacity);
        self.chunk = vec![0.0; window_size].into_boxed_slice();
        self.window = vec![0.0; window_size].into_boxed_slice();
    }

    /// Filters `input`, which must not be longer than the window, and appends
    /// the result to the buffer.
    fn filter_and_write(&mut self, input: &[f32]) {
        let chunk = &mut self.chunk[..input.len()];
        chunk.copy_from_slice(input);
        self.high_pass.process_in_place(chunk);
        self.low_pass.process_in_place(chunk);
        self.buffer.write(chunk);
    }

    fn read_window(&mut self, start_position: i64) -> bool {
        self.buffer.read(&mut self.window, start_position)
    }

    /// Drops the first `count` samples of the window.
    fn shift_window(&mut self, count: usize) {
        let len = self.window.len();
        self.window.copy_within(count..len, 0);
    }

    /// Clears filter state and pre-seeds the buffer with `silence` zero
    /// samples ending right before position 0.
    fn reset(&mut self, silence: usize) {
        self.high_pass.reset();
        self.low_pass.reset();
        self.buffer.reset(-(silence as i64));
        self.buffer.set_available(silence);
    }
}

/// Continuously estimates the fundamental frequency of a mono audio stream,
/// emitting one [PitchRecord] per pitch block.
///
/// The input is split into two bands: 45-280 Hz (lo) and 45-1500 Hz (hi).
/// For each pitch block, the periodicity estimator runs on a window
/// of both bands, and then again on the same window shifted by a few
/// milliseconds. The pitch is only reported if both estimates agree.
///
/// Records only depend on the input stream, not on how it is split into
/// blocks. Call [reset](PitchTracker::reset) whenever the input is discontinuous.
pub struct PitchTracker<E: PeriodicityEstimator = MpmEstimator> {
    sample_rate: f64,
    detect_level_threshold: f32,
    pitch_records_per_second: u32,
    lo: Band,
    hi: Band,
    /// None until a valid sample rate has been set.
    estimator: Option<E>,
    pitch_window_samples: usize,
    detect_overlap_samples: usize,
    samples_per_pitch_block: usize,
    max_overlap_diff: f32,
    current_pitch_position: i64,
    pitch_block_index: u64,
    latest_record: Option<PitchRecord>,
    record_history: VecDeque<PitchRecord>,
    record_history_size: usize,
}

impl PitchTracker {
    /// Creates a tracker using the default settings and MPM estimator.
    pub fn new(sample_rate: f64) -> Self {
        PitchTracker::from_config(PitchTrackerConfig {
            sample_rate,
            ..PitchTrackerConfig::default()
        })
    }

    pub fn from_config(config: PitchTrackerConfig) -> Self {
        PitchTracker::with_estimator(config)
    }
}

impl Default for PitchTracker {
    fn default() -> Self {
        PitchTracker::new(DEFAULT_SAMPLE_RATE)
    }
}

impl<E: PeriodicityEstimator> PitchTracker<E> {
    /// Creates a tracker using a custom periodicity estimator.
    pub fn with_estimator(config: PitchTrackerConfig) -> Self {
        let record_history_size = config.record_history_size.min(MAX_RECORD_HISTORY_SIZE);
        let mut tracker = PitchTracker {
            sample_rate: config.sample_rate,
            detect_level_threshold: clamp_detect_level_threshold(config.detect_level_threshold),
            pitch_records_per_second: clamp_pitch_records_per_second(config.pitch_records_per_second),
            lo: Band::new(config.sample_rate, LO_BAND_LOW_PASS_CORNER),
            hi: Band::new(config.sample_rate, HI_BAND_LOW_PASS_CORNER),
            estimator: None,
            pitch_window_samples: 0,
            detect_overlap_samples: 0,
            samples_per_pitch_block: 0,
            max_overlap_diff: MAX_OVERLAP_DIFF,
            current_pitch_position: 0,
            pitch_block_index: 0,
            latest_record: None,
            record_history: VecDeque::with_capacity(record_history_size),
            record_history_size,
        };
        tracker.setup();
        tracker
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Sets the input sample rate in Hz. An invalid sample rate disables the tracker
    /// until a valid one is set.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        if self.sample_rate != sample_rate {
            self.sample_rate = sample_rate;
            self.setup();
        }
    }

    pub fn detect_level_threshold(&self) -> f32 {
        self.detect_level_threshold
    }

    /// Sets the peak level below which input is considered silent. Clamped to `[0.0001, 1]`.
    pub fn set_detect_level_threshold(&mut self, threshold: f32) {
        let threshold = clamp_detect_level_threshold(threshold);
        if self.detect_level_threshold != threshold {
            self.detect_level_threshold = threshold;
            self.setup();
        }
    }

    pub fn pitch_records_per_second(&self) -> u32 {
        self.pitch_records_per_second
    }

    /// Sets the pitch record rate. Clamped to `[1, 100]`.
    pub fn set_pitch_records_per_second(&mut self, records_per_second: u32) {
        let records_per_second = clamp_pitch_records_per_second(records_per_second);
        if self.pitch_records_per_second != records_per_second {
            self.pitch_records_per_second = records_per_second;
            self.setup();
        }
    }

    pub fn record_history_size(&self) -> usize {
        self.record_history_size
    }

    /// Sets the number of most recent records to keep. 0 disables the history.
    pub fn set_record_history_size(&mut self, size: usize) {
        let size = size.min(MAX_RECORD_HISTORY_SIZE);
        self.record_history_size = size;
        while self.record_history.len() > size {
            self.record_history.pop_front();
        }
    }

    /// The recorded history, oldest record first.
    pub fn records(&self) -> vec_deque::Iter<'_, PitchRecord> {
        self.record_history.iter()
    }

    /// The most recently emitted record, if any since the last reset.
    pub fn latest_record(&self) -> Option<PitchRecord> {
        self.latest_record
    }

    /// Indicates if the tracker has a valid configuration and will emit records.
    pub fn is_configured(&self) -> bool {
        self.estimator.is_some()
    }

    pub fn estimator(&self) -> Option<&E> {
        self.estimator.as_ref()
    }

    /// The number of input samples between consecutive pitch records.
    pub fn samples_per_pitch_block(&self) -> usize {
        self.samples_per_pitch_block
    }

    /// The absolute input position where the next analyzed window starts.
    pub fn current_pitch_sample_position(&self) -> i64 {
        self.current_pitch_position
    }

    /// Approximate offset from the start of an analyzed window to the input
    /// sample its record best describes.
    pub fn detect_sample_offset(&self) -> usize {
        (self.pitch_window_samples + self.detect_overlap_samples) / 2
    }

    /// The number of samples analyzed per estimate.
    pub fn pitch_window_samples(&self) -> usize {
        self.pitch_window_samples
    }

    /// The distance in samples between the two estimates of a pitch block.
    pub fn detect_overlap_samples(&self) -> usize {
        self.detect_overlap_samples
    }

    /// Clears all filter state, buffered samples and records. Must be called
    /// when the input stream is discontinuous, e.g after seeking.
    pub fn reset(&mut self) {
        let overlap = self.detect_overlap_samples;
        self.lo.reset(overlap);
        self.hi.reset(overlap);
        self.current_pitch_position = 0;
        self.pitch_block_index = 0;
        self.latest_record = None;
        self.record_history.clear();
    }

    /// Processes a block of any size, invoking `handler` for each completed pitch block.
    pub fn process<F>(&mut self, samples: &[f32], mut handler: F)
    where
        F: FnMut(&PitchRecord),
    {
        if self.estimator.is_none() {
            return;
        }
        let max_chunk_size = self.pitch_window_samples + self.detect_overlap_samples;
        for chunk in samples.chunks(max_chunk_size) {
            self.lo.filter_and_write(chunk);
            self.hi.filter_and_write(chunk);
            self.emit_pitch_records(&mut handler);
        }
    }

    /// Like [process](PitchTracker::process), but only consumes the first
    /// `sample_count` samples. A `sample_count` of 0 means the whole block.
    pub fn process_count<F>(
        &mut self,
        samples: &[f32],
        sample_count: usize,
        handler: F,
    ) -> Result<(), TrackerError>
    where
        F: FnMut(&PitchRecord),
    {
        let count = if sample_count == 0 { samples.len() } else { sample_count };
        if count > samples.len() {
            return Err(TrackerError::SampleCountOutOfRange {
                requested: count,
                available: samples.len(),
            });
        }
        self.process(&samples[..count], handler);
        Ok(())
    }

    fn setup(&mut self) {
        let sample_rate = self.sample_rate;
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            log::warn!("Invalid sample rate {} Hz, pitch tracking disabled", sample_rate);
            self.estimator = None;
            self.reset();
            return;
        }

        self.detect_overlap_samples = (DETECT_OVERLAP_SEC * sample_rate) as usize;
        self.max_overlap_diff = MAX_OVERLAP_DIFF;
        let pitch_window_sec =
            2.0 / (MIN_FREQUENCY as f64) + ((AVG_COUNT - 1) as f64) * AVG_OFFSET_SEC;
        self.pitch_window_samples =
            (pitch_window_sec * sample_rate).round() as usize + PITCH_WINDOW_SLACK_SAMPLES;
        self.samples_per_pitch_block =
            ((sample_rate / (self.pitch_records_per_second as f64)).round() as usize).max(1);

        let buffer_capacity = (BUFFER_HISTORY_SEC * sample_rate) as usize + BUFFER_SLACK_SAMPLES;
        let window_size = self.pitch_window_samples + self.detect_overlap_samples;
        self.lo.configure(sample_rate, buffer_capacity, window_size);
        self.hi.configure(sample_rate, buffer_capacity, window_size);

        self.estimator = Some(E::from_config(&EstimatorConfig {
            sample_rate,
            min_frequency: MIN_FREQUENCY,
            max_frequency: MAX_FREQUENCY,
            detect_level_threshold: self.detect_level_threshold,
            window_size: self.pitch_window_samples,
            crossover_frequency: LO_BAND_LOW_PASS_CORNER as f32,
        }));

        log::debug!(
            "Pitch tracker setup: {} Hz, window {} samples, overlap {} samples, {} samples per pitch block",
            sample_rate,
            self.pitch_window_samples,
            self.detect_overlap_samples,
            self.samples_per_pitch_block
        );

        self.reset();
    }

    /// Emits a record for every pitch block whose window is available in both bands.
    fn emit_pitch_records<F>(&mut self, handler: &mut F)
    where
        F: FnMut(&PitchRecord),
    {
        let estimator = match self.estimator.as_mut() {
            Some(estimator) => estimator,
            None => return,
        };
        let window = self.pitch_window_samples;
        let overlap = self.detect_overlap_samples;

        while self.lo.read_window(self.current_pitch_position)
            && self.hi.read_window(self.current_pitch_position)
        {
            let mut frequency = 0.0;
            let pitch_1 = estimator.estimate(&self.lo.window[..window], &self.hi.window[..window]);
            if pitch_1 > 0.0 {
                self.lo.shift_window(overlap);
                self.hi.shift_window(overlap);
                let pitch_2 = estimator.estimate(&self.lo.window[..window], &self.hi.window[..window]);
                if pitch_2 > 0.0 {
                    let difference = (pitch_1.max(pitch_2) / pitch_1.min(pitch_2) - 1.0).abs();
                    if difference < self.max_overlap_diff {
                        frequency = 0.5 * (pitch_1 + pitch_2);
                    }
                }
            }

            let record = PitchRecord {
                index: self.pitch_block_index,
                sample_position: self.current_pitch_position,
                frequency,
            };
            if self.record_history_size > 0 {
                if self.record_history.len() >= self.record_history_size {
                    self.record_history.pop_front();
                }
                self.record_history.push_back(record);
            }
            self.latest_record = Some(record);
            handler(&record);

            self.current_pitch_position += self.samples_per_pitch_block as i64;
            self.pitch_block_index += 1;
        }
    }
}
