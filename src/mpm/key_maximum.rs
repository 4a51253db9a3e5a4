/// A key maximum, i.e an NSDF maximum that may or may not correspond
/// to the pitch period.
#[derive(Copy, Clone, Debug)]
pub struct KeyMaximum {
    /// The index into the NSDF array corresponding to this maximum
    pub lag_index: usize,
    /// The NSDF value at `lag_index` for this maximum
    pub value_at_lag_index: f32,
    /// The NSDF value for this maximum, approximated using parabolic interpolation.
    pub value: f32,
    /// The lag, in samples, for this maximum, approximated using parabolic interpolation.
    pub lag: f32,
}

impl KeyMaximum {
    pub(crate) fn new() -> Self {
        KeyMaximum {
            lag_index: 0,
            value_at_lag_index: 0.0,
            value: 0.0,
            lag: 0.0,
        }
    }

    pub(crate) fn set(&mut self, nsdf: &[f32], lag_index: usize) {
        let value_at_lag_index = nsdf[lag_index];
        let left = nsdf[lag_index.saturating_sub(1)];
        let right = nsdf[(lag_index + 1).min(nsdf.len() - 1)];

        // Parabola ax^2 + bx + c through (-1, left), (0, max), (1, right)
        let a = 0.5 * (right - 2.0 * value_at_lag_index + left);
        let b = 0.5 * (right - left);
        let x_max = if a != 0.0 { -b / (2.0 * a) } else { 0.0 };

        self.lag_index = lag_index;
        self.value_at_lag_index = value_at_lag_index;
        self.value = a * x_max * x_max + b * x_max + value_at_lag_index;
        self.lag = (lag_index as f32) + x_max;
    }
}
