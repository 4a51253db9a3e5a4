//! Analytically designed [Butterworth](https://en.wikipedia.org/wiki/Butterworth_filter)
//! low and high pass IIR filters for streaming use.
//!
//! # Example
//! ```
//! use micro_pitch_tracker::iir::{FilterType, IirFilter};
//!
//! let mut filter = IirFilter::new(FilterType::HighPass, 5, 44100.0, 45.0);
//! // The peak passband gain is normalized to 0 dB.
//! assert!(filter.filter_gain().abs() < 1e-6);
//!
//! let mut block = vec![0.0; 256];
//! filter.process_in_place(&mut block);
//! ```

mod iir_filter;

pub use iir_filter::{FilterType, IirFilter, DENORMAL_BIAS, MAX_ORDER};
