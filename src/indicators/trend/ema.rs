use stats::mean;

/// Exponential moving average with smoothing factor `2 / (period + 1)`.
///
/// Leading NaN values are skipped, so the average can be chained onto the
/// output of another indicator. The first value is the simple mean of the
/// first `period` valid inputs; everything before it is NaN.
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; data.len()];
    if period == 0 {
        return out;
    }

    let Some(start) = data.iter().position(|v| !v.is_nan()) else {
        return out;
    };
    let seed_end = start + period;
    if seed_end > data.len() {
        return out;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = mean(&data[start..seed_end]);
    out[seed_end - 1] = prev;

    for i in seed_end..data.len() {
        prev = alpha * data[i] + (1.0 - alpha) * prev;
        out[i] = prev;
    }

    out
}
