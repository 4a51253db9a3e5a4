use core::f64::consts::PI;

use num_complex::Complex64;

/// The highest supported filter order.
pub const MAX_ORDER: usize = 16;
/// One second order section per conjugate pole pair, plus one first order section for odd orders.
const MAX_SECTION_COUNT: usize = (MAX_ORDER + 1) / 2;
/// Magnitude of the bias added to each input sample to keep the recursion
/// out of denormal territory during silence.
pub const DENORMAL_BIAS: f64 = 1e-15;
/// Number of frequency steps between DC and Nyquist used when searching for the peak gain.
const GAIN_STEPS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
}

/// A second order section in transposed direct form II. First order
/// sections have `a2 == b2 == 0`.
#[derive(Debug, Clone, Copy, Default)]
struct Section {
    a0: f64,
    a1: f64,
    a2: f64,
    b1: f64,
    b2: f64,
    z1: f64,
    z2: f64,
}

impl Section {
    /// Sets coefficients from numerator and monic denominator polynomials in z^-1,
    /// scaling the numerator for unit gain at `z^-1 = reference`. Keeps the state.
    fn set_normalized(&mut self, numerator: [f64; 3], denominator: [f64; 3], reference: f64) {
        let evaluate = |p: &[f64; 3]| p[0] + reference * (p[1] + reference * p[2]);
        let scale = evaluate(&denominator) / evaluate(&numerator);
        self.a0 = scale * numerator[0];
        self.a1 = scale * numerator[1];
        self.a2 = scale * numerator[2];
        self.b1 = denominator[1];
        self.b2 = denominator[2];
    }

    fn scale_numerator(&mut self, scale: f64) {
        self.a0 *= scale;
        self.a1 *= scale;
        self.a2 *= scale;
    }

    fn response(&self, z_inv: Complex64) -> Complex64 {
        let numerator = (z_inv * self.a2 + self.a1) * z_inv + self.a0;
        let denominator = (z_inv * self.b2 + self.b1) * z_inv + 1.0;
        numerator / denominator
    }

    fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    #[inline]
    fn tick(&mut self, x: f64) -> f64 {
        let y = self.a0 * x + self.z1;
        self.z1 = self.a1 * x - self.b1 * y + self.z2;
        self.z2 = self.a2 * x - self.b2 * y;
        y
    }
}

/// A [Butterworth](https://en.wikipedia.org/wiki/Butterworth_filter) low or high pass
/// [IIR filter](https://en.wikipedia.org/wiki/Infinite_impulse_response),
/// designed using the bilinear transform and run as a cascade of second order sections.
///
/// Changing any parameter redesigns the filter. Designing an invalid filter
/// (non-positive sample rate, corner frequency at or above Nyquist etc) does
/// nothing, leaving the previous coefficients in place. A filter that was never
/// validly designed passes its input through unchanged.
pub struct IirFilter {
    filter_type: FilterType,
    order: usize,
    sample_rate: f64,
    /// Corner frequency used in high pass mode.
    freq_low: f64,
    /// Corner frequency used in low pass mode.
    freq_high: f64,
    /// The order the current coefficients were designed for.
    design_order: usize,
    /// Expanded numerator (feedforward) coefficients of the whole cascade.
    a: [f64; MAX_ORDER + 1],
    /// Expanded denominator (feedback) coefficients of the whole cascade. `b[0]` is always 1.
    b: [f64; MAX_ORDER + 1],
    sections: [Section; MAX_SECTION_COUNT],
    section_count: usize,
    /// Steady state gain of the alternating bias, i.e the gain at Nyquist.
    bias_gain: f64,
    bias: f64,
}

impl IirFilter {
    /// Creates a filter with a single corner frequency, interpreted according to `filter_type`.
    pub fn new(filter_type: FilterType, order: usize, sample_rate: f64, corner_frequency: f64) -> Self {
        let mut filter = IirFilter {
            filter_type,
            order: order.clamp(1, MAX_ORDER),
            sample_rate,
            freq_low: corner_frequency,
            freq_high: corner_frequency,
            design_order: 0,
            a: [0.0; MAX_ORDER + 1],
            b: [0.0; MAX_ORDER + 1],
            sections: [Section::default(); MAX_SECTION_COUNT],
            section_count: 0,
            bias_gain: 0.0,
            bias: DENORMAL_BIAS,
        };
        filter.a[0] = 1.0;
        filter.b[0] = 1.0;
        filter.design();
        filter
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        if self.filter_type != filter_type {
            self.filter_type = filter_type;
            self.design();
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Sets the filter order, clamped to `1..=MAX_ORDER`.
    pub fn set_order(&mut self, order: usize) {
        let order = order.clamp(1, MAX_ORDER);
        if self.order != order {
            self.order = order;
            self.design();
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        if self.sample_rate != sample_rate {
            self.sample_rate = sample_rate;
            self.design();
        }
    }

    pub fn freq_low(&self) -> f64 {
        self.freq_low
    }

    pub fn set_freq_low(&mut self, freq_low: f64) {
        if self.freq_low != freq_low {
            self.freq_low = freq_low;
            self.design();
        }
    }

    pub fn freq_high(&self) -> f64 {
        self.freq_high
    }

    pub fn set_freq_high(&mut self, freq_high: f64) {
        if self.freq_high != freq_high {
            self.freq_high = freq_high;
            self.design();
        }
    }

    /// The corner frequency in effect for the current filter type.
    pub fn corner_frequency(&self) -> f64 {
        match self.filter_type {
            FilterType::LowPass => self.freq_high,
            FilterType::HighPass => self.freq_low,
        }
    }

    pub fn is_valid(&self) -> bool {
        let corner = self.corner_frequency();
        self.sample_rate > 0.0
            && self.sample_rate.is_finite()
            && corner > 0.0
            && corner < 0.5 * self.sample_rate
            && self.order >= 1
            && self.order <= MAX_ORDER
    }

    /// Numerator coefficients of the current design.
    pub fn a(&self) -> &[f64] {
        &self.a[..=self.design_order]
    }

    /// Denominator coefficients of the current design.
    pub fn b(&self) -> &[f64] {
        &self.b[..=self.design_order]
    }


    /// Computes filter coefficients from the current parameters.
    pub fn design(&mut self) {
        if !self.is_valid() {
            log::debug!(
                "Skipping design of invalid {:?} filter, order {}, corner {} Hz, sample rate {} Hz",
                self.filter_type,
                self.order,
                self.corner_frequency(),
                self.sample_rate
            );
            return;
        }

        let order = self.order;
        // Pre-warped analog corner for a bilinear transform with T = 1.
        let warped = 2.0 * (PI * self.corner_frequency() / self.sample_rate).tan();
        let bilinear = |s: Complex64| (2.0 + s) / (2.0 - s);

        // All zeros at Nyquist (low pass) or DC (high pass). Each section is
        // normalized at the opposite end of the spectrum, where the Butterworth
        // response peaks.
        let (zero_sign, reference) = match self.filter_type {
            FilterType::LowPass => (1.0, 1.0),
            FilterType::HighPass => (-1.0, -1.0),
        };

        // The prototype poles lie on a half circle in the left half plane. The
        // high pass transform s -> w/s maps that set of poles onto itself,
        // so both types share denominators.
        let mut section_count = 0;
        for k in 0..order / 2 {
            let angle = PI * ((2 * k + order + 1) as f64) / ((2 * order) as f64);
            let z = bilinear(Complex64::from_polar(warped, angle));
            self.sections[section_count].set_normalized(
                [1.0, 2.0 * zero_sign, 1.0],
                [1.0, -2.0 * z.re, z.norm_sqr()],
                reference,
            );
            section_count += 1;
        }
        if order % 2 == 1 {
            let z = bilinear(Complex64::new(-warped, 0.0));
            self.sections[section_count].set_normalized([1.0, zero_sign, 0.0], [1.0, -z.re, 0.0], reference);
            section_count += 1;
        }
        for section in self.sections[section_count..].iter_mut() {
            *section = Section::default();
        }
        self.section_count = section_count;
        self.design_order = order;

        let gain_db = self.filter_gain();
        self.sections[0].scale_numerator(10.0_f64.powf(-gain_db / 20.0));
        self.bias_gain = self.response(PI).re;
        self.expand_polynomials();
    }

    /// Multiplies the sections into the transfer function polynomials `a` and `b`.
    fn expand_polynomials(&mut self) {
        let mut a = [0.0; MAX_ORDER + 1];
        let mut b = [0.0; MAX_ORDER + 1];
        a[0] = 1.0;
        b[0] = 1.0;
        let mut degree = 0;
        for section in self.sections[..self.section_count].iter() {
            if section.a2 == 0.0 && section.b2 == 0.0 {
                multiply_polynomial(&mut a, degree, &[section.a0, section.a1]);
                multiply_polynomial(&mut b, degree, &[1.0, section.b1]);
                degree += 1;
            } else {
                multiply_polynomial(&mut a, degree, &[section.a0, section.a1, section.a2]);
                multiply_polynomial(&mut b, degree, &[1.0, section.b1, section.b2]);
                degree += 2;
            }
        }
        self.a = a;
        self.b = b;
    }

    /// Returns the peak gain in dB of the current design, searched over
    /// frequencies from DC to Nyquist.
    pub fn filter_gain(&self) -> f64 {
        let mut max_magnitude: f64 = 0.0;
        for step in 0..=GAIN_STEPS {
            let omega = PI * (step as f64) / (GAIN_STEPS as f64);
            let magnitude = self.response(omega).norm();
            if magnitude > max_magnitude {
                max_magnitude = magnitude;
            }
        }
        20.0 * max_magnitude.log10()
    }

    /// Evaluates the transfer function at the normalized angular frequency `omega`.
    fn response(&self, omega: f64) -> Complex64 {
        let z_inv = Complex64::from_polar(1.0, -omega);
        self.sections[..self.section_count]
            .iter()
            .fold(Complex64::new(1.0, 0.0), |product, section| product * section.response(z_inv))
    }

    /// Clears the filter state without touching the coefficients.
    pub fn reset(&mut self) {
        for section in self.sections.iter_mut() {
            section.reset();
        }
        self.bias = DENORMAL_BIAS;
    }

    /// Filters `input` into `output`, which must have the same length.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        if input.len() != output.len() {
            panic!("IIR filter input and output buffers must have the same size");
        }
        for (x, y) in input.iter().zip(output.iter_mut()) {
            *y = self.tick(*x);
        }
    }

    /// Filters `buffer` in place.
    pub fn process_in_place(&mut self, buffer: &mut [f32]) {
        for value in buffer.iter_mut() {
            *value = self.tick(*value);
        }
    }

    fn tick(&mut self, input: f32) -> f32 {
        if self.section_count == 0 {
            return input;
        }
        let bias = self.bias;
        // Flip per sample, not per call, so that the output does not depend
        // on how the input is chunked.
        self.bias = -bias;

        let mut y = input as f64 + bias;
        for section in self.sections[..self.section_count].iter_mut() {
            y = section.tick(y);
        }
        // The bias alternates at Nyquist, so once settled it contributes
        // exactly `bias_gain * bias` to the output.
        (y - self.bias_gain * bias) as f32
    }
}

/// Multiplies the polynomial `poly` of degree `degree` in place by `factor`.
/// `poly` must have room for the product.
fn multiply_polynomial(poly: &mut [f64], degree: usize, factor: &[f64]) {
    let product_degree = degree + factor.len() - 1;
    for i in (0..=product_degree).rev() {
        let mut sum = 0.0;
        for (j, f) in factor.iter().enumerate() {
            if j <= i && i - j <= degree {
                sum += f * poly[i - j];
            }
        }
        poly[i] = sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(sample_rate: f64, frequency: f64, sample_count: usize) -> Vec<f32> {
        (0..sample_count)
            .map(|i| (2.0 * PI * frequency * (i as f64) / sample_rate).sin() as f32)
            .collect()
    }

    /// Steady state gain of a filtered sine, skipping the transient.
    fn measured_gain(filter: &mut IirFilter, frequency: f64) -> f32 {
        let sample_count = filter.sample_rate() as usize;
        let input = sine(filter.sample_rate(), frequency, sample_count);
        let mut output = vec![0.0; input.len()];
        filter.process(&input, &mut output);
        assert!(output.iter().all(|value| value.is_finite()));
        let peak = |buffer: &[f32]| buffer.iter().fold(0.0_f32, |m, v| m.max(v.abs()));
        peak(&output[sample_count / 2..]) / peak(&input[sample_count / 2..])
    }

    #[test]
    fn test_multiply_polynomial() {
        let mut poly = [1.0, 1.0, 0.0, 0.0];
        multiply_polynomial(&mut poly, 1, &[1.0, 2.0, 3.0]);
        // (1 + x)(1 + 2x + 3x^2)
        assert_eq!(poly, [1.0, 3.0, 5.0, 3.0]);
    }

    #[test]
    fn test_gain_normalization() {
        for &filter_type in [FilterType::LowPass, FilterType::HighPass].iter() {
            for order in 1..=MAX_ORDER {
                for &corner in [45.0, 280.0, 1500.0, 5000.0].iter() {
                    let filter = IirFilter::new(filter_type, order, 44100.0, corner);
                    assert!(filter.is_valid());
                    assert!(filter.filter_gain().abs() < 1e-6, "{:?} {} {}", filter_type, order, corner);
                    assert_eq!(filter.section_count, (order + 1) / 2);
                    assert_eq!(filter.b()[0], 1.0);
                    assert_eq!(filter.a().len(), order + 1);
                }
            }
        }
    }

    #[test]
    fn test_low_pass_response() {
        let mut filter = IirFilter::new(FilterType::LowPass, 5, 44100.0, 1000.0);
        assert!((measured_gain(&mut filter, 100.0) - 1.0).abs() < 0.01);
        filter.reset();
        assert!((measured_gain(&mut filter, 1000.0) - 0.7071).abs() < 0.02);
        filter.reset();
        assert!(measured_gain(&mut filter, 4000.0) < 0.01);
    }

    #[test]
    fn test_high_pass_response() {
        let mut filter = IirFilter::new(FilterType::HighPass, 5, 44100.0, 45.0);
        assert!((measured_gain(&mut filter, 1000.0) - 1.0).abs() < 0.01);
        filter.reset();
        assert!((measured_gain(&mut filter, 45.0) - 0.7071).abs() < 0.02);
        filter.reset();
        assert!(measured_gain(&mut filter, 10.0) < 0.01);
    }

    #[test]
    fn test_silence_stays_silent() {
        for &filter_type in [FilterType::LowPass, FilterType::HighPass].iter() {
            for &order in [1, 2, 5, 16].iter() {
                for &corner in [45.0, 1500.0].iter() {
                    let mut filter = IirFilter::new(filter_type, order, 44100.0, corner);
                    let input = vec![0.0; 44100];
                    let mut output = vec![1.0; input.len()];
                    filter.process(&input, &mut output);
                    for value in output.iter() {
                        assert!((value.abs() as f64) <= DENORMAL_BIAS, "{:?} {} {}", filter_type, order, corner);
                    }
                }
            }
        }
    }

    #[test]
    fn test_high_sample_rate() {
        let mut filter = IirFilter::new(FilterType::HighPass, 5, 384000.0, 45.0);
        assert!((measured_gain(&mut filter, 220.0) - 1.0).abs() < 0.01);
        let mut filter = IirFilter::new(FilterType::LowPass, 5, 384000.0, 280.0);
        assert!((measured_gain(&mut filter, 100.0) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_max_order_response() {
        let mut filter = IirFilter::new(FilterType::HighPass, MAX_ORDER, 44100.0, 45.0);
        assert!((measured_gain(&mut filter, 1000.0) - 1.0).abs() < 0.01);
        filter.reset();
        assert!((measured_gain(&mut filter, 45.0) - 0.7071).abs() < 0.02);
        filter.reset();
        assert!(measured_gain(&mut filter, 20.0) < 0.01);
    }

    #[test]
    fn test_impulse_response_is_bounded() {
        for &filter_type in [FilterType::LowPass, FilterType::HighPass].iter() {
            for order in 1..=MAX_ORDER {
                for &corner in [45.0, 280.0, 1500.0].iter() {
                    let mut filter = IirFilter::new(filter_type, order, 44100.0, corner);
                    let mut buffer = vec![0.0; 44100];
                    buffer[0] = 1.0;
                    filter.process_in_place(&mut buffer);
                    assert!(
                        buffer.iter().all(|value| value.is_finite() && value.abs() < 2.0),
                        "{:?} {} {}",
                        filter_type,
                        order,
                        corner
                    );
                    // Fully decayed after one second
                    assert!(buffer[44000..].iter().all(|value| value.abs() < 1e-6));
                }
            }
        }
    }

    #[test]
    fn test_chunking_independence() {
        let input = sine(44100.0, 333.0, 5000);
        let mut whole = IirFilter::new(FilterType::HighPass, 5, 44100.0, 45.0);
        let mut chunked = IirFilter::new(FilterType::HighPass, 5, 44100.0, 45.0);
        let mut expected = input.clone();
        whole.process_in_place(&mut expected);
        let mut actual = input.clone();
        for chunk in actual.chunks_mut(7) {
            chunked.process_in_place(chunk);
        }
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let input = sine(44100.0, 440.0, 1000);
        let mut filter = IirFilter::new(FilterType::LowPass, 4, 44100.0, 800.0);
        let mut first = vec![0.0; input.len()];
        filter.process(&input, &mut first);
        filter.reset();
        let mut second = vec![0.0; input.len()];
        filter.process(&input, &mut second);
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_design_is_skipped() {
        let mut filter = IirFilter::new(FilterType::LowPass, 5, 44100.0, 1000.0);
        let a: Vec<f64> = filter.a().to_vec();
        let b: Vec<f64> = filter.b().to_vec();

        filter.set_freq_high(-10.0);
        assert!(!filter.is_valid());
        assert_eq!(filter.a(), &a[..]);
        assert_eq!(filter.b(), &b[..]);

        filter.set_freq_high(30000.0);
        assert!(!filter.is_valid());
        assert_eq!(filter.a(), &a[..]);

        filter.set_freq_high(2000.0);
        assert!(filter.is_valid());
        assert_ne!(filter.a(), &a[..]);
    }

    #[test]
    fn test_never_designed_filter_passes_through() {
        let mut filter = IirFilter::new(FilterType::HighPass, 5, 0.0, 45.0);
        assert!(!filter.is_valid());
        let input = [0.5_f32, -0.25, 0.125];
        let mut output = [0.0; 3];
        filter.process(&input, &mut output);
        for (x, y) in input.iter().zip(output.iter()) {
            assert!((x - y).abs() <= 1e-6);
        }
    }

    #[test]
    fn test_order_is_clamped() {
        let mut filter = IirFilter::new(FilterType::LowPass, 0, 44100.0, 1000.0);
        assert_eq!(filter.order(), 1);
        filter.set_order(40);
        assert_eq!(filter.order(), MAX_ORDER);
    }
}
