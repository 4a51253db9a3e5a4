//! A rust implementation of the MPM [pitch](https://en.wikipedia.org/wiki/Pitch_%28music%29) detection algorithm,
//! described in the paper [A smarter way to find pitch](http://www.cs.otago.ac.nz/tartini/papers/A_Smarter_Way_to_Find_Pitch.pdf)
//! by Philip McLeod and Geoff Wyvill.
//!
//! * Autocorrelation is computed using real-only FFT.
//! * Computation of the NSDF is accelerated using the incremental scheme described in the paper.
//! * No memory is allocated after initialization.
//!
//! [MpmEstimator] plugs the algorithm into the [PitchTracker](crate::tracker::PitchTracker).
//! [MpmPitchResult] is the single window API.
//!
//! # Example
//! ```
//! use micro_pitch_tracker::mpm::MpmPitchResult;
//!
//! let sample_rate = 11025.0;
//! let frequency = 220.0;
//! let mut result = MpmPitchResult::new(512, 256);
//! for (i, value) in result.window.iter_mut().enumerate() {
//!     *value = (2.0 * std::f32::consts::PI * frequency * (i as f32) / sample_rate).sin();
//! }
//! result.compute(sample_rate);
//! assert!(result.is_tone());
//! assert!((result.frequency - frequency).abs() < 2.0);
//! ```
//!
//! # A note on clarity and false positives
//! The clarity of a result is the NSDF value at the peak assumed to correspond to
//! the pitch period. Noisy input may produce occasional large NSDF peaks, so a single
//! clarity value is not enough to tell if the input has a discernable fundamental
//! frequency. A periodic signal has equispaced NSDF maxima, which is what
//! [is_tone](MpmPitchResult::is_tone) checks for.

mod key_maximum;
mod mpm_estimator;
mod result;
mod util;

pub use key_maximum::KeyMaximum;
pub use mpm_estimator::MpmEstimator;
pub use result::{MpmPitchResult, DEFAULT_CLARITY_THRESHOLD, DEFAULT_CLARITY_TOLERANCE, MAX_KEY_MAXIMA_COUNT};
