use std::f64::consts::PI;

use matlib::least_squares;

// ============================================================================
// Moments
// ============================================================================

pub fn mean(x: &[f64]) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    x.iter().sum::<f64>() / x.len() as f64
}

/// Variance with `ddof` delta degrees of freedom (0 = population)
pub fn variance(x: &[f64], ddof: usize) -> f64 {
    let n = x.len();
    if n <= ddof {
        return f64::NAN;
    }
    let m = mean(x);
    x.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (n - ddof) as f64
}

// ============================================================================
// Normal log density
// ============================================================================

pub fn normal_log_pdf(x: f64, mean: f64, var: f64) -> f64 {
    let diff = x - mean;
    -0.5 * ((2.0 * PI * var).ln() + diff * diff / var)
}

// ============================================================================
// Log-sum-exp (stable)
// ============================================================================

pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

// ============================================================================
// Trapezoidal integration
// ============================================================================

/// Area under the piecewise-linear curve through `(x[i], y[i])`
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
        .sum()
}

// ============================================================================
// Normal Distribution
// ============================================================================

/// Error function, Abramowitz and Stegun 7.1.26 (absolute error below 1.5e-7)
pub fn erf(x: f64) -> f64 {
    const A: [f64; 5] = [0.254829592, -0.284496736, 1.421413741, -1.453152027, 1.061405429];
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = A.iter().rev().fold(0.0, |acc, &a| acc * t + a) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal cumulative distribution function
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

// ============================================================================
// Correlation
// ============================================================================

/// Pearson correlation; NaN when either series is constant
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return f64::NAN;
    }
    let ma = mean(&a[..n]);
    let mb = mean(&b[..n]);

    let mut sab = 0.0;
    let mut saa = 0.0;
    let mut sbb = 0.0;
    for i in 0..n {
        let da = a[i] - ma;
        let db = b[i] - mb;
        sab += da * db;
        saa += da * da;
        sbb += db * db;
    }

    if saa == 0.0 || sbb == 0.0 {
        return f64::NAN;
    }
    sab / (saa * sbb).sqrt()
}

/// Symmetric `n x n` correlation matrix (row-major) of the given series
pub fn correlation_matrix(series: &[Vec<f64>]) -> Vec<f64> {
    let n = series.len();
    let mut matrix = vec![0.0; n * n];
    for i in 0..n {
        for j in i..n {
            let r = if i == j {
                1.0
            } else {
                pearson(&series[i], &series[j])
            };
            matrix[i * n + j] = r;
            matrix[j * n + i] = r;
        }
    }
    matrix
}

// ============================================================================
// Variance inflation factors
// ============================================================================

/// VIF of every column of a row-major `nrows x ncols` matrix.
///
/// Column `j` is regressed on the remaining columns plus an intercept;
/// VIF = 1 / (1 - R^2). A perfect fit yields infinity.
pub fn variance_inflation_factors(
    data: &[f64],
    nrows: usize,
    ncols: usize,
) -> Result<Vec<f64>, String> {
    if data.len() != nrows * ncols {
        return Err("Dimension mismatch in VIF input".to_string());
    }
    if ncols < 2 {
        return Err("VIF needs at least two columns".to_string());
    }
    if nrows <= ncols {
        return Err(format!("VIF needs more rows than columns, got {} rows", nrows));
    }

    let mut vifs = Vec::with_capacity(ncols);

    for target in 0..ncols {
        let n_pred = ncols; // intercept + (ncols - 1) other columns
        let mut design = Vec::with_capacity(nrows * n_pred);
        let mut y = Vec::with_capacity(nrows);

        for row in data.chunks_exact(ncols) {
            design.push(1.0);
            for (j, &v) in row.iter().enumerate() {
                if j != target {
                    design.push(v);
                }
            }
            y.push(row[target]);
        }

        let coefs = least_squares(&design, &y, nrows, n_pred)?;

        let y_mean = mean(&y);
        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;
        for (i, row) in design.chunks_exact(n_pred).enumerate() {
            let fitted = matlib::dot(row, &coefs);
            ss_res += (y[i] - fitted) * (y[i] - fitted);
            ss_tot += (y[i] - y_mean) * (y[i] - y_mean);
        }

        if ss_tot == 0.0 {
            return Err(format!("Column {} is constant", target));
        }

        let r2 = 1.0 - ss_res / ss_tot;
        vifs.push(if r2 >= 1.0 { f64::INFINITY } else { 1.0 / (1.0 - r2) });
    }

    Ok(vifs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_variance() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        assert!((mean(&x) - 2.5).abs() < 1e-12);
        assert!((variance(&x, 0) - 1.25).abs() < 1e-12);
        assert!((variance(&x, 1) - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_normal_log_pdf_peak() {
        let v = normal_log_pdf(0.0, 0.0, 1.0);
        assert!((v - (-0.5 * (2.0 * PI).ln())).abs() < 1e-12);
    }

    #[test]
    fn test_log_sum_exp() {
        let v = log_sum_exp(&[0.0, 0.0]);
        assert!((v - 2.0_f64.ln()).abs() < 1e-12);
        let big = log_sum_exp(&[1000.0, 1000.0]);
        assert!((big - (1000.0 + 2.0_f64.ln())).abs() < 1e-9);
    }

    #[test]
    fn test_trapezoid_diagonal() {
        assert!((trapezoid(&[0.0, 1.0], &[0.0, 1.0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_normal_cdf() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-9);
        assert!((normal_cdf(1.96) - 0.975).abs() < 1e-4);
        assert!((normal_cdf(-1.0) - 0.158655).abs() < 1e-5);
        assert!((erf(0.5) + erf(-0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_pearson() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let b = vec![2.0, 4.0, 6.0, 8.0];
        let c = vec![4.0, 3.0, 2.0, 1.0];
        assert!((pearson(&a, &b) - 1.0).abs() < 1e-12);
        assert!((pearson(&a, &c) + 1.0).abs() < 1e-12);
        assert!(pearson(&a, &[1.0, 1.0, 1.0, 1.0]).is_nan());
    }

    #[test]
    fn test_correlation_matrix_is_symmetric() {
        let series = vec![vec![1.0, 2.0, 3.0], vec![3.0, 1.0, 2.0]];
        let m = correlation_matrix(&series);
        assert_eq!(m[0], 1.0);
        assert_eq!(m[3], 1.0);
        assert_eq!(m[1], m[2]);
    }

    #[test]
    fn test_vif_independent_columns_near_one() {
        // orthogonal, centred columns
        let data = vec![
            1.0, 1.0, //
            -1.0, 1.0, //
            1.0, -1.0, //
            -1.0, -1.0,
        ];
        let vifs = variance_inflation_factors(&data, 4, 2).unwrap();
        for v in vifs {
            assert!((v - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_vif_collinear_columns_large() {
        let mut data = Vec::new();
        for i in 0..20 {
            let x = i as f64;
            data.push(x);
            data.push(2.0 * x + 0.01 * ((i * 7 % 5) as f64));
        }
        let vifs = variance_inflation_factors(&data, 20, 2).unwrap();
        assert!(vifs[0] > 100.0);
        assert!(vifs[1] > 100.0);
    }
}
