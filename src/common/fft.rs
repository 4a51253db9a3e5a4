use core::convert::TryInto;

use microfft::Complex32;

/// Performs an in-place real FFT on `buffer`, whose length must be a power of
/// two between 16 and 4096. The returned spectrum has `buffer.len() / 2` bins,
/// with the real valued Nyquist coefficient packed into the imaginary part
/// of the DC bin.
pub fn real_fft(buffer: &mut [f32]) -> &mut [Complex32] {
    let fft_size = buffer.len();
    match fft_size {
        16 => microfft::real::rfft_16(buffer.try_into().unwrap()),
        32 => microfft::real::rfft_32(buffer.try_into().unwrap()),
        64 => microfft::real::rfft_64(buffer.try_into().unwrap()),
        128 => microfft::real::rfft_128(buffer.try_into().unwrap()),
        256 => microfft::real::rfft_256(buffer.try_into().unwrap()),
        512 => microfft::real::rfft_512(buffer.try_into().unwrap()),
        1024 => microfft::real::rfft_1024(buffer.try_into().unwrap()),
        2048 => microfft::real::rfft_2048(buffer.try_into().unwrap()),
        4096 => microfft::real::rfft_4096(buffer.try_into().unwrap()),
        _ => panic!("Unsupported fft size {}", fft_size),
    }
}
