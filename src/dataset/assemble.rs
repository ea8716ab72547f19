use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{FeatureMatrix, MasterTable};
use crate::error::{EvalError, Result};

/// Which index to predict and which table columns to feed the models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub target: String,
    pub features: Vec<String>,
}

impl DatasetSpec {
    pub fn label_name(&self) -> String {
        format!("{}_OPEN_DIR", self.target)
    }
}

/// Model-ready rows: features at day `t`, label realised at day `t + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub dates: Vec<NaiveDate>,
    pub x: FeatureMatrix,
    pub y: Vec<u8>,
    pub label: String,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// Opening direction: 1 when `open[t] > close[t-1]`, else 0.
///
/// The first day has no prior close and reads 0.
pub fn open_direction(open: &[f64], close: &[f64]) -> Vec<u8> {
    let n = open.len().min(close.len());
    let mut dir = Vec::with_capacity(n);
    if n == 0 {
        return dir;
    }
    dir.push(0);
    for t in 1..n {
        dir.push(u8::from(open[t] > close[t - 1]));
    }
    dir
}

/// Count of `[negatives, positives]`
pub fn class_counts(y: &[u8]) -> [usize; 2] {
    let positives = y.iter().filter(|&&v| v == 1).count();
    [y.len() - positives, positives]
}

/// Build the labelled dataset from a master table with derived columns.
///
/// The label of row `t` is the opening direction of day `t + 1`, so the last
/// day is dropped. Every row holding a NaN in any table column is dropped as
/// well, which keeps the row set independent of the chosen features.
pub fn assemble(table: &MasterTable, spec: &DatasetSpec) -> Result<Dataset> {
    if spec.features.is_empty() {
        return Err(EvalError::ShapeMismatch("no feature columns requested".to_string()));
    }

    let open = table.column(&format!("{}_OPEN", spec.target))?;
    let close = table.column(&format!("{}_CLOSE", spec.target))?;
    let direction = open_direction(open, close);

    let feature_columns: Vec<&[f64]> = spec
        .features
        .iter()
        .map(|name| table.column(name))
        .collect::<Result<_>>()?;

    let n = table.len();
    let mut dates = Vec::new();
    let mut x = FeatureMatrix::empty(spec.features.clone());
    let mut y = Vec::new();
    let mut row = vec![0.0; spec.features.len()];

    for t in 0..n.saturating_sub(1) {
        let complete = table.columns.iter().all(|c| !c.values[t].is_nan());
        if !complete {
            continue;
        }
        for (slot, column) in row.iter_mut().zip(&feature_columns) {
            *slot = column[t];
        }
        x.push_row(&row)?;
        y.push(direction[t + 1]);
        dates.push(table.dates[t]);
    }

    let [neg, pos] = class_counts(&y);
    info!(
        rows = y.len(),
        dropped = n - y.len(),
        negatives = neg,
        positives = pos,
        "assembled dataset"
    );

    Ok(Dataset {
        dates,
        x,
        y,
        label: spec.label_name(),
    })
}
