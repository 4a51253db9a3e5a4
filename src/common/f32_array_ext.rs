//! `[f32]` level measurements.

use micromath::F32Ext;

/// `[f32]` extensions.
pub trait F32ArrayExt {
    /// Returns the maximum absolute value, or 0 for an empty slice.
    fn peak_level(&self) -> f32;
}

impl F32ArrayExt for [f32] {
    fn peak_level(&self) -> f32 {
        self.iter().fold(0.0_f32, |max, sample| max.max(F32Ext::abs(*sample)))
    }
}

#[cfg(test)]
mod tests {
    use super::F32ArrayExt;

    #[test]
    fn test_peak_level() {
        let empty: [f32; 0] = [];
        assert_eq!(empty.peak_level(), 0.0);
        assert_eq!([0.5_f32, -1.0, 0.25, 0.0].peak_level(), 1.0);
        assert_eq!([-0.125_f32, 0.0625].peak_level(), 0.125);
    }
}
