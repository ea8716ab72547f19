//! Error types shared by the data layer, the models and the evaluation core.

use thiserror::Error;

use crate::evaluation::Partition;

/// Errors raised by the library.
#[derive(Error, Debug)]
pub enum EvalError {
    /// A classifier could not be fitted.
    #[error("Model fitting failed: {0}")]
    FitError(String),

    /// Sensitivity or specificity has a zero denominator.
    #[error("{metric} is undefined on the {partition} partition")]
    UndefinedMetric {
        metric: &'static str,
        partition: Partition,
    },

    /// Row or column counts disagree.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Input that no ROC curve or resampling plan can be built from.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// A requested column is not present in the table.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed value in an input file.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Plot error: {0}")]
    Plot(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EvalError>;
