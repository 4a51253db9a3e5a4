/// Computes m' defined in eq (6) of the MPM paper, using the incremental
/// subtraction described in section 6 - Efficient calculation of SDF.
pub(crate) fn m_prime_incremental(window: &[f32], autocorr_at_lag_0: f32, result: &mut [f32]) {
    let lag_count = result.len();
    let window_size = window.len();
    assert!(lag_count <= window_size, "Lag count must not be greater than the window size");
    if lag_count == 0 {
        return;
    }

    result[0] = 2.0 * autocorr_at_lag_0;
    for i in 1..lag_count {
        let v1 = window[window_size - i];
        let v2 = window[i - 1];
        result[i] = result[i - 1] - v1 * v1 - v2 * v2;
    }
}
