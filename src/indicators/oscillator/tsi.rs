use crate::trend::ema;

/// True Strength Index: double-smoothed momentum over double-smoothed
/// absolute momentum, scaled to [-100, 100].
///
/// Momentum is `close[t] - close[t-1]`. Both series are smoothed first with
/// an EMA of `long` periods, then with an EMA of `short` periods. Entries
/// before the smoothing has warmed up are NaN; a zero denominator reads 0.
pub fn tsi(close: &[f64], long: usize, short: usize) -> Vec<f64> {
    let n = close.len();
    let mut momentum = vec![f64::NAN; n];
    let mut abs_momentum = vec![f64::NAN; n];
    for i in 1..n {
        let m = close[i] - close[i - 1];
        momentum[i] = m;
        abs_momentum[i] = m.abs();
    }

    let num = ema(&ema(&momentum, long), short);
    let den = ema(&ema(&abs_momentum, long), short);

    num.iter()
        .zip(&den)
        .map(|(&a, &b)| {
            if a.is_nan() || b.is_nan() {
                f64::NAN
            } else if b == 0.0 {
                0.0
            } else {
                100.0 * a / b
            }
        })
        .collect()
}
