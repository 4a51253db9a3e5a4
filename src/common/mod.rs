//! Common algorithms and utilities.

mod autocorr;
mod circular_buffer;
mod f32_array_ext;
mod fft;
mod midi;

pub use autocorr::{autocorr_conv, autocorr_fft_size, Autocorrelation};
pub use circular_buffer::CircularBuffer;
pub use f32_array_ext::F32ArrayExt;
pub use fft::real_fft;
pub use midi::freq_to_midi_note;
