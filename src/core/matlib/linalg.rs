/*
--------------------------------------------------------------------------------
   Dense linear algebra on row-major slices
--------------------------------------------------------------------------------
*/

/// Inner product of two equal-length slices
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Solve `a * x = b` for a square `n x n` row-major matrix using Gaussian
/// elimination with partial pivoting.
///
/// Returns an error when a pivot underflows, which callers treat as a
/// singular (or numerically singular) system.
pub fn gauss_elimination(a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>, String> {
    if a.len() != n * n || b.len() != n {
        return Err(format!(
            "Dimension mismatch: matrix has {} entries, rhs has {}, n = {}",
            a.len(),
            b.len(),
            n
        ));
    }

    let mut a = a.to_vec();
    let mut b = b.to_vec();

    // Scale used for the singularity test so that tiny but well-conditioned
    // systems are not rejected.
    let scale = a.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())).max(1e-300);

    for col in 0..n {
        let mut max_row = col;
        for row in (col + 1)..n {
            if a[row * n + col].abs() > a[max_row * n + col].abs() {
                max_row = row;
            }
        }

        if max_row != col {
            for j in 0..n {
                a.swap(col * n + j, max_row * n + j);
            }
            b.swap(col, max_row);
        }

        if a[col * n + col].abs() < 1e-13 * scale {
            return Err("Matrix is singular".to_string());
        }

        for row in (col + 1)..n {
            let factor = a[row * n + col] / a[col * n + col];
            for j in col..n {
                a[row * n + j] -= factor * a[col * n + j];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        x[i] = b[i];
        for j in (i + 1)..n {
            x[i] -= a[i * n + j] * x[j];
        }
        x[i] /= a[i * n + i];
    }

    Ok(x)
}

/// Ordinary least squares through the normal equations.
///
/// `a_matrix` is `nrows x ncols` row-major. Returns the coefficient vector of
/// length `ncols`.
pub fn least_squares(
    a_matrix: &[f64],
    b_vector: &[f64],
    nrows: usize,
    ncols: usize,
) -> Result<Vec<f64>, String> {
    if a_matrix.len() != nrows * ncols || b_vector.len() != nrows {
        return Err("Dimension mismatch in least squares".to_string());
    }

    let mut ata = vec![0.0; ncols * ncols];
    for i in 0..ncols {
        for j in i..ncols {
            let mut sum = 0.0;
            for k in 0..nrows {
                sum += a_matrix[k * ncols + i] * a_matrix[k * ncols + j];
            }
            ata[i * ncols + j] = sum;
            ata[j * ncols + i] = sum;
        }
    }

    let mut atb = vec![0.0; ncols];
    for (i, slot) in atb.iter_mut().enumerate() {
        let mut sum = 0.0;
        for k in 0..nrows {
            sum += a_matrix[k * ncols + i] * b_vector[k];
        }
        *slot = sum;
    }

    gauss_elimination(&ata, &atb, ncols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauss_elimination_solves_system() {
        // 2x + y = 5, x + 3y = 10
        let a = vec![2.0, 1.0, 1.0, 3.0];
        let b = vec![5.0, 10.0];
        let x = gauss_elimination(&a, &b, 2).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_gauss_elimination_needs_pivoting() {
        let a = vec![0.0, 1.0, 1.0, 0.0];
        let b = vec![2.0, 3.0];
        let x = gauss_elimination(&a, &b, 2).unwrap();
        assert!((x[0] - 3.0).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_gauss_elimination_singular() {
        let a = vec![1.0, 2.0, 2.0, 4.0];
        let b = vec![1.0, 2.0];
        assert!(gauss_elimination(&a, &b, 2).is_err());
    }

    #[test]
    fn test_least_squares_recovers_line() {
        // y = 1 + 2x with an intercept column
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let mut a = Vec::new();
        let mut b = Vec::new();
        for &x in &xs {
            a.push(1.0);
            a.push(x);
            b.push(1.0 + 2.0 * x);
        }
        let coefs = least_squares(&a, &b, xs.len(), 2).unwrap();
        assert!((coefs[0] - 1.0).abs() < 1e-10);
        assert!((coefs[1] - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_dot() {
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
    }
}
