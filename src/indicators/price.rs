/*
--------------------------------------------------------------------------------
   Per-day price transforms
--------------------------------------------------------------------------------
*/

/// Simple daily returns `close[t] / close[t-1] - 1`; the first entry is NaN
pub fn daily_returns(close: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(close.len());
    if close.is_empty() {
        return out;
    }
    out.push(f64::NAN);
    out.extend(close.windows(2).map(|w| w[1] / w[0] - 1.0));
    out
}

/// Intraday range ratio `high[t] / low[t]`
pub fn hl_ratio(high: &[f64], low: &[f64]) -> Vec<f64> {
    high.iter().zip(low).map(|(h, l)| h / l).collect()
}

/// Overnight gap ratio `open[t] / close[t-1]`; the first entry is NaN
pub fn oc_ratio(open: &[f64], close: &[f64]) -> Vec<f64> {
    let n = open.len().min(close.len());
    let mut out = Vec::with_capacity(n);
    if n == 0 {
        return out;
    }
    out.push(f64::NAN);
    for t in 1..n {
        out.push(open[t] / close[t - 1]);
    }
    out
}
