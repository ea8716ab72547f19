use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{EvalError, Result};

/// Daily OHLC history of one market index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSeries {
    pub name: String,
    pub dates: Vec<NaiveDate>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

impl IndexSeries {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            dates: Vec::new(),
            open: Vec::new(),
            high: Vec::new(),
            low: Vec::new(),
            close: Vec::new(),
        }
    }

    /// Get the number of bars
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn push(&mut self, date: NaiveDate, open: f64, high: f64, low: f64, close: f64) {
        self.dates.push(date);
        self.open.push(open);
        self.high.push(high);
        self.low.push(low);
        self.close.push(close);
    }

    /// Reorder bars into ascending date order
    fn sort_by_date(&mut self) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by_key(|&i| self.dates[i]);

        let permute = |v: &[f64]| order.iter().map(|&i| v[i]).collect::<Vec<f64>>();
        self.open = permute(&self.open);
        self.high = permute(&self.high);
        self.low = permute(&self.low);
        self.close = permute(&self.close);
        self.dates = order.iter().map(|&i| self.dates[i]).collect();
    }
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Read a Yahoo-style daily history (`Date,Open,High,Low,Close,...`).
///
/// Columns are located by header name, so extra columns such as `Adj Close`
/// and `Volume` are ignored. Rows whose prices are `null` or fail to parse
/// are skipped. The result is sorted by date.
pub fn read_index_file<P: AsRef<Path>>(path: P, name: &str) -> Result<IndexSeries> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let position = |wanted: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                EvalError::Parse(format!("{}: missing '{}' column", path.display(), wanted))
            })
    };
    let date_col = position("Date")?;
    let price_cols = [
        position("Open")?,
        position("High")?,
        position("Low")?,
        position("Close")?,
    ];

    let mut series = IndexSeries::new(name);
    let mut skipped = 0usize;

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let raw_date = record.get(date_col).unwrap_or("");
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|e| {
            EvalError::Parse(format!(
                "{}: invalid date '{}' on line {}: {}",
                path.display(),
                raw_date,
                line + 2,
                e
            ))
        })?;

        let mut prices = [0.0; 4];
        let mut valid = true;
        for (slot, &col) in prices.iter_mut().zip(&price_cols) {
            match record.get(col).and_then(|s| s.parse::<f64>().ok()) {
                Some(v) if v.is_finite() => *slot = v,
                _ => {
                    valid = false;
                    break;
                }
            }
        }

        if !valid {
            skipped += 1;
            continue;
        }

        let [open, high, low, close] = prices;
        series.push(date, open, high, low, close);
    }

    series.sort_by_date();
    debug!(index = name, rows = series.len(), skipped, "read index file");

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_index_file_skips_null_rows_and_sorts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("DJI.csv");
        fs::write(
            &path,
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-03,11,12,10,11.5,11.5,100\n\
             2024-01-02,10,11,9,10.5,10.5,100\n\
             2024-01-04,null,null,null,null,null,null\n",
        )
        .unwrap();

        let series = read_index_file(&path, "DJI").unwrap();
        assert_eq!(series.name, "DJI");
        assert_eq!(series.len(), 2);
        assert_eq!(series.dates[0], NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(series.open, vec![10.0, 11.0]);
        assert_eq!(series.close, vec![10.5, 11.5]);
    }

    #[test]
    fn test_read_index_file_missing_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "Date,Open,High,Low\n2024-01-02,1,2,0.5\n").unwrap();

        let err = read_index_file(&path, "BAD").unwrap_err();
        assert!(matches!(err, EvalError::Parse(_)));
    }

    #[test]
    fn test_read_index_file_bad_date() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "Date,Open,High,Low,Close\n02/01/2024,1,2,0.5,1\n").unwrap();

        assert!(matches!(
            read_index_file(&path, "BAD"),
            Err(EvalError::Parse(_))
        ));
    }
}
