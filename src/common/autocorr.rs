use super::fft::real_fft;

/// Computes the length of the FFT needed to compute `lag_count` autocorrelation
/// values of a `buffer_size` long buffer without circular convolution effects.
pub fn autocorr_fft_size(buffer_size: usize, lag_count: usize) -> usize {
    assert!(lag_count <= buffer_size);
    let min_length = buffer_size + lag_count - 1;
    let mut result: usize = 16; // Smallest size handled by real_fft
    while result < min_length {
        result <<= 1;
    }
    result
}

/// FFT accelerated [autocorrelation](https://en.wikipedia.org/wiki/Autocorrelation)
/// of fixed size buffers. All memory is allocated on creation.
pub struct Autocorrelation {
    lag_count: usize,
    buffer_size: usize,
    fft_buffer: Box<[f32]>,
    psd_buffer: Box<[f32]>,
}

impl Autocorrelation {
    /// # Arguments
    ///
    /// * `buffer_size` - The size of the buffers to process.
    /// * `lag_count` - The number of autocorrelation values to compute.
    pub fn new(buffer_size: usize, lag_count: usize) -> Self {
        let fft_size = autocorr_fft_size(buffer_size, lag_count);
        Autocorrelation {
            lag_count,
            buffer_size,
            fft_buffer: vec![0.0; fft_size].into_boxed_slice(),
            psd_buffer: vec![0.0; fft_size].into_boxed_slice(),
        }
    }

    pub fn lag_count(&self) -> usize {
        self.lag_count
    }

    /// Computes the autocorrelation of `buffer` and writes it to
    /// `result`, which must hold `lag_count()` values.
    pub fn compute(&mut self, buffer: &[f32], result: &mut [f32]) {
        if buffer.len() != self.buffer_size || result.len() != self.lag_count {
            panic!(
                "Autocorrelation expects a buffer of length {} and a result of length {}, got {} and {}",
                self.buffer_size,
                self.lag_count,
                buffer.len(),
                result.len()
            )
        }

        // Zero padded input
        self.fft_buffer[..buffer.len()].copy_from_slice(buffer);
        for element in self.fft_buffer.iter_mut().skip(buffer.len()) {
            *element = 0.0
        }

        // Power spectral density, unpacked into a full real signal so the
        // inverse transform can be done using a forward real FFT.
        let psd_length = self.psd_buffer.len();
        let spectrum = real_fft(&mut self.fft_buffer);
        self.psd_buffer[0] = spectrum[0].re * spectrum[0].re;
        for (index, bin) in spectrum.iter().enumerate().skip(1) {
            let norm_sq = bin.norm_sqr();
            self.psd_buffer[index] = norm_sq;
            self.psd_buffer[psd_length - index] = norm_sq;
        }
        self.psd_buffer[spectrum.len()] = spectrum[0].im * spectrum[0].im;

        let autocorr = real_fft(&mut self.psd_buffer);
        let scale = 1.0 / (psd_length as f32);
        for (value, bin) in result.iter_mut().zip(autocorr.iter()) {
            *value = scale * bin.re;
        }
    }
}

/// Computes the autocorrelation of `window` by direct summation.
pub fn autocorr_conv(window: &[f32], result: &mut [f32]) {
    let window_size = window.len();
    if window_size < result.len() {
        panic!("Result vector must not be longer than the window.");
    }

    for (tau, value) in result.iter_mut().enumerate() {
        *value = window[..window_size - tau]
            .iter()
            .zip(window[tau..].iter())
            .map(|(a, b)| a * b)
            .sum();
    }
}
