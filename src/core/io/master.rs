use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use super::index::DATE_FORMAT;
use crate::dataset::MasterTable;
use crate::error::{EvalError, Result};

/// Persist the master table as CSV with a leading `DATE` column.
///
/// NaN values are written as empty fields.
pub fn write_master_file<P: AsRef<Path>>(path: P, table: &MasterTable) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["DATE".to_string()];
    header.extend(table.columns.iter().map(|c| c.name.clone()));
    writer.write_record(&header)?;

    for (i, date) in table.dates.iter().enumerate() {
        let mut record = Vec::with_capacity(table.columns.len() + 1);
        record.push(date.format(DATE_FORMAT).to_string());
        for column in &table.columns {
            let v = column.values[i];
            record.push(if v.is_nan() { String::new() } else { v.to_string() });
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    info!(path = %path.display(), rows = table.len(), columns = table.columns.len(), "wrote master file");
    Ok(())
}

/// Load a master table written by [`write_master_file`].
pub fn read_master_file<P: AsRef<Path>>(path: P) -> Result<MasterTable> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    match headers.get(0) {
        Some(h) if h.eq_ignore_ascii_case("DATE") => {}
        _ => {
            return Err(EvalError::Parse(format!(
                "{}: first column must be DATE",
                path.display()
            )));
        }
    }
    let names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut dates = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let raw_date = record.get(0).unwrap_or("");
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|e| {
            EvalError::Parse(format!("{}: line {}: {}", path.display(), line + 2, e))
        })?;
        dates.push(date);

        for (j, column) in values.iter_mut().enumerate() {
            let field = record.get(j + 1).unwrap_or("");
            column.push(parse_cell(field).ok_or_else(|| {
                EvalError::Parse(format!(
                    "{}: line {}: invalid value '{}' in {}",
                    path.display(),
                    line + 2,
                    field,
                    names[j]
                ))
            })?);
        }
    }

    let mut table = MasterTable::new(dates);
    for (name, column) in names.iter().zip(values) {
        table.insert_column(name, column)?;
    }
    Ok(table)
}

fn parse_cell(field: &str) -> Option<f64> {
    if field.is_empty() || field.eq_ignore_ascii_case("nan") || field.eq_ignore_ascii_case("null") {
        return Some(f64::NAN);
    }
    field.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_master_file_keeps_values_and_gaps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data/master.csv");

        let d1 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let mut table = MasterTable::new(vec![d1, d2]);
        table.insert_column("DJI_CLOSE", vec![37715.04, 37430.19]).unwrap();
        table.insert_column("DJI_DAILY_RETURNS", vec![f64::NAN, -0.0075]).unwrap();

        write_master_file(&path, &table).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("DATE,DJI_CLOSE,DJI_DAILY_RETURNS\n2024-01-02,37715.04,\n"));

        let back = read_master_file(&path).unwrap();
        assert_eq!(back.dates, table.dates);
        assert_eq!(back.column("DJI_CLOSE").unwrap(), &[37715.04, 37430.19]);
        let returns = back.column("DJI_DAILY_RETURNS").unwrap();
        assert!(returns[0].is_nan());
        assert_eq!(returns[1], -0.0075);
    }

    #[test]
    fn test_read_master_file_requires_date_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("master.csv");
        fs::write(&path, "X,Y\n1,2\n").unwrap();
        assert!(matches!(read_master_file(&path), Err(EvalError::Parse(_))));
    }
}
