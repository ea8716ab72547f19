use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, warn};

use open_direction::dataset::MasterTable;

use crate::config::DateWindow;

/// Pearson correlations of daily returns over one date window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub window: DateWindow,
    /// Rows left after dropping incomplete ones
    pub n_rows: usize,
    pub columns: Vec<String>,
    /// Row-major, `columns.len()` squared entries
    pub values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.columns.len() + j]
    }

    /// Largest off-diagonal correlation in absolute value
    pub fn strongest_pair(&self) -> Option<(&str, &str, f64)> {
        let n = self.columns.len();
        let mut best: Option<(usize, usize, f64)> = None;
        for i in 0..n {
            for j in i + 1..n {
                let r = self.get(i, j);
                if r.is_finite() && best.is_none_or(|(_, _, b)| r.abs() > b.abs()) {
                    best = Some((i, j, r));
                }
            }
        }
        best.map(|(i, j, r)| (self.columns[i].as_str(), self.columns[j].as_str(), r))
    }
}

impl fmt::Display for CorrelationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.columns.iter().map(|c| c.len()).max().unwrap_or(0);
        writeln!(f, "Daily Returns - {} ({} rows)", self.window.label(), self.n_rows)?;

        write!(f, "{:width$}", "")?;
        for name in &self.columns {
            write!(f, "  {name:>width$}")?;
        }
        writeln!(f)?;

        for (i, name) in self.columns.iter().enumerate() {
            write!(f, "{name:<width$}")?;
            for j in 0..self.columns.len() {
                write!(f, "  {:>width$.3}", self.get(i, j))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Daily-return column of every index, in the given order
pub fn return_columns(indices: &[String]) -> Vec<String> {
    indices.iter().map(|i| format!("{i}_DAILY_RETURNS")).collect()
}

/// Correlate the daily returns of `indices` over the rows inside `window`.
///
/// `table` must already carry the derived return columns, computed over the
/// whole history so the first row of the window has a return. Rows with a
/// missing return in any column are dropped.
pub fn return_correlations(
    table: &MasterTable,
    indices: &[String],
    window: &DateWindow,
) -> Result<CorrelationMatrix> {
    let columns = return_columns(indices);
    let slice = table.between(window.start, window.end);

    let raw: Vec<&[f64]> = columns
        .iter()
        .map(|c| slice.column(c))
        .collect::<open_direction::Result<_>>()
        .context("Daily returns have not been derived")?;

    let complete: Vec<usize> = (0..slice.len())
        .filter(|&row| raw.iter().all(|col| col[row].is_finite()))
        .collect();
    if complete.len() < slice.len() {
        debug!(dropped = slice.len() - complete.len(), "incomplete rows dropped");
    }
    if complete.len() < 2 {
        anyhow::bail!(
            "Window {} has {} complete rows, need at least 2",
            window.label(),
            complete.len()
        );
    }

    let series: Vec<Vec<f64>> = raw
        .iter()
        .map(|col| complete.iter().map(|&row| col[row]).collect())
        .collect();
    let values = stats::correlation_matrix(&series);
    if values.iter().any(|v| v.is_nan()) {
        warn!(window = %window.label(), "constant returns in window, some correlations are NaN");
    }

    Ok(CorrelationMatrix {
        window: window.clone(),
        n_rows: complete.len(),
        columns,
        values,
    })
}
