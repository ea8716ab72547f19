use serde::Serialize;

use crate::error::{EvalError, Result};

/// Row-major matrix of feature values with named columns.
///
/// Rows are observations (trading days, in time order); the value of column
/// `k` in row `i` lives at `data[i * n_cols + k]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub n_rows: usize,
    pub data: Vec<f64>,
}

impl FeatureMatrix {
    pub fn new(columns: Vec<String>, n_rows: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != n_rows * columns.len() {
            return Err(EvalError::ShapeMismatch(format!(
                "{} values cannot fill {} rows of {} columns",
                data.len(),
                n_rows,
                columns.len()
            )));
        }
        Ok(Self {
            columns,
            n_rows,
            data,
        })
    }

    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            n_rows: 0,
            data: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: &[Vec<f64>]) -> Result<Self> {
        let mut matrix = Self::empty(columns);
        for row in rows {
            matrix.push_row(row)?;
        }
        Ok(matrix)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn row(&self, i: usize) -> &[f64] {
        let n = self.n_cols();
        &self.data[i * n..(i + 1) * n]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact(0) panics, and a column-less matrix has no row data anyway
        let width = self.n_cols().max(1);
        self.data.chunks_exact(width).take(self.n_rows)
    }

    pub fn column(&self, k: usize) -> Vec<f64> {
        self.rows().map(|row| row[k]).collect()
    }

    pub fn push_row(&mut self, row: &[f64]) -> Result<()> {
        if row.len() != self.n_cols() {
            return Err(EvalError::ShapeMismatch(format!(
                "row has {} values, matrix has {} columns",
                row.len(),
                self.n_cols()
            )));
        }
        self.data.extend_from_slice(row);
        self.n_rows += 1;
        Ok(())
    }

    /// New matrix holding the given rows, in the given order
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let mut data = Vec::with_capacity(rows.len() * self.n_cols());
        for &i in rows {
            data.extend_from_slice(self.row(i));
        }
        Self {
            columns: self.columns.clone(),
            n_rows: rows.len(),
            data,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Identical column names in identical order
    pub fn same_columns(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_row_major_layout() {
        let m = FeatureMatrix::from_rows(
            names(&["a", "b"]),
            &[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
        )
        .unwrap();
        assert_eq!(m.n_rows, 3);
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert_eq!(m.column(1), vec![2.0, 4.0, 6.0]);
        assert_eq!(m.select_rows(&[2, 0]).data, vec![5.0, 6.0, 1.0, 2.0]);
    }

    #[test]
    fn test_shape_checks() {
        assert!(matches!(
            FeatureMatrix::new(names(&["a", "b"]), 2, vec![1.0, 2.0, 3.0]),
            Err(EvalError::ShapeMismatch(_))
        ));
        let mut m = FeatureMatrix::empty(names(&["a"]));
        assert!(m.push_row(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_is_finite_and_same_columns() {
        let a = FeatureMatrix::from_rows(names(&["a"]), &[vec![1.0], vec![f64::NAN]]).unwrap();
        let b = FeatureMatrix::from_rows(names(&["a"]), &[vec![1.0]]).unwrap();
        let c = FeatureMatrix::from_rows(names(&["b"]), &[vec![1.0]]).unwrap();
        assert!(!a.is_finite());
        assert!(b.is_finite());
        assert!(a.same_columns(&b));
        assert!(!b.same_columns(&c));
    }
}
