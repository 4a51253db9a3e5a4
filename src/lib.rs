//! A streaming pitch tracker for monophonic, primarily musical, sounds.
//!
//! Audio of any block size is split into a low (45-280 Hz) and a wide (45-1500 Hz)
//! band using [Butterworth](iir) filters. At a fixed rate, the pitch of a 40 ms window
//! of both bands is estimated using the [McLeod pitch method](mpm), and then
//! confirmed on a slightly later window. Each estimate is reported as a
//! [PitchRecord](tracker::PitchRecord).
//!
//! * No memory is allocated while processing, apart from the optional record history.
//! * Records do not depend on how the input is split into blocks.
//! * Unlike the `no_std` MPM code it grew from, the crate requires `std`, since
//!   filter design relies on `f64` trigonometry from the standard library.
//!
//! # Example
//! ```
//! use micro_pitch_tracker::PitchTracker;
//!
//! let sample_rate = 44100.0;
//! let mut tracker = PitchTracker::new(sample_rate);
//!
//! // One second of a 220 Hz tone
//! let tone: Vec<f32> = (0..44100)
//!     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 220.0 * (i as f32) / 44100.0).sin())
//!     .collect();
//!
//! let mut pitched_records = 0;
//! for block in tone.chunks(512) {
//!     tracker.process(block, |record| {
//!         if (record.frequency - 220.0).abs() < 5.0 {
//!             pitched_records += 1;
//!         }
//!     });
//! }
//! assert!(pitched_records > 30);
//! ```

pub mod common;
pub mod iir;
pub mod mpm;
pub mod tracker;

pub use tracker::{PitchRecord, PitchTracker, PitchTrackerConfig, TrackerError};
