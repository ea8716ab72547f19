use std::collections::HashMap;

use chrono::NaiveDate;

use crate::core::io::IndexSeries;
use crate::error::{EvalError, Result};

/// One named numeric column of the master table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// Date-aligned table of raw and derived per-index columns.
///
/// Every column has one value per entry of `dates`; missing values are NaN.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasterTable {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<Column>,
}

impl MasterTable {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: Vec::new(),
        }
    }

    /// Inner join of several index histories on date.
    ///
    /// Produces `{NAME}_OPEN`, `{NAME}_HIGH`, `{NAME}_LOW` and `{NAME}_CLOSE`
    /// for each series, in the order the series are given. Only dates present
    /// in every series are kept.
    pub fn merge(series: &[IndexSeries]) -> Result<Self> {
        let Some(first) = series.first() else {
            return Ok(Self::default());
        };

        let lookups: Vec<HashMap<NaiveDate, usize>> = series
            .iter()
            .map(|s| s.dates.iter().enumerate().map(|(i, &d)| (d, i)).collect())
            .collect();

        let mut dates: Vec<NaiveDate> = first
            .dates
            .iter()
            .copied()
            .filter(|d| lookups.iter().all(|l| l.contains_key(d)))
            .collect();
        dates.sort();
        dates.dedup();

        let mut table = Self::new(dates);
        for (s, lookup) in series.iter().zip(&lookups) {
            let rows: Vec<usize> = table.dates.iter().map(|d| lookup[d]).collect();
            let pick = |v: &[f64]| rows.iter().map(|&i| v[i]).collect::<Vec<f64>>();
            table.insert_column(&format!("{}_OPEN", s.name), pick(&s.open))?;
            table.insert_column(&format!("{}_HIGH", s.name), pick(&s.high))?;
            table.insert_column(&format!("{}_LOW", s.name), pick(&s.low))?;
            table.insert_column(&format!("{}_CLOSE", s.name), pick(&s.close))?;
        }

        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Add a column, replacing any existing column of the same name in place.
    pub fn insert_column(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        if values.len() != self.len() {
            return Err(EvalError::ShapeMismatch(format!(
                "column '{}' has {} values, table has {} rows",
                name,
                values.len(),
                self.len()
            )));
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(Column {
                name: name.to_string(),
                values,
            }),
        }
        Ok(())
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| EvalError::UnknownColumn(name.to_string()))
    }

    /// New table holding the given rows, in the given order
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            dates: rows.iter().map(|&i| self.dates[i]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: rows.iter().map(|&i| c.values[i]).collect(),
                })
                .collect(),
        }
    }

    /// Rows dated within `[start, end]`, both ends inclusive
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let rows: Vec<usize> = self
            .dates
            .iter()
            .enumerate()
            .filter(|(_, d)| **d >= start && **d <= end)
            .map(|(i, _)| i)
            .collect();
        self.select_rows(&rows)
    }
}
