use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ConfusionTable, RocCurve, auc, compute_roc, confusion_counts, round_to, select_threshold};
use crate::dataset::FeatureMatrix;
use crate::error::{EvalError, Result};
use crate::models::Classifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Train,
    Test,
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partition::Train => write!(f, "train"),
            Partition::Test => write!(f, "test"),
        }
    }
}

/// Metrics of one partition at the training-selected threshold.
///
/// `sensitivity` and `specificity` are percentages rounded to 2 decimal
/// places, `auc` is rounded to 3.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionMetrics {
    pub n_rows: usize,
    pub auc: f64,
    pub sensitivity: f64,
    pub specificity: f64,
    pub accuracy: f64,
    pub confusion: ConfusionTable,
    #[serde(skip)]
    pub roc: RocCurve,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsBundle {
    pub model: String,
    pub threshold: f64,
    pub train: PartitionMetrics,
    pub test: PartitionMetrics,
}

fn check_pair(x: &FeatureMatrix, y: &[u8], partition: Partition) -> Result<()> {
    if x.n_rows != y.len() {
        return Err(EvalError::ShapeMismatch(format!(
            "{partition} partition has {} feature rows but {} labels",
            x.n_rows,
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(EvalError::DegenerateInput(format!("{partition} partition is empty")));
    }
    if !x.is_finite() {
        return Err(EvalError::DegenerateInput(format!(
            "{partition} partition contains non-finite feature values"
        )));
    }
    if let Some(bad) = y.iter().find(|&&v| v > 1) {
        return Err(EvalError::FitError(format!(
            "{partition} label {bad} is not binary"
        )));
    }
    Ok(())
}

fn partition_metrics(
    partition: Partition,
    scores: &[f64],
    labels: &[u8],
    threshold: f64,
    roc: Option<RocCurve>,
) -> Result<PartitionMetrics> {
    let confusion = confusion_counts(scores, labels, threshold);
    let sensitivity = confusion.sensitivity(partition)?;
    let specificity = confusion.specificity(partition)?;
    let roc = match roc {
        Some(roc) => roc,
        None => compute_roc(scores, labels)?,
    };

    Ok(PartitionMetrics {
        n_rows: labels.len(),
        auc: round_to(auc(&roc), 3),
        sensitivity,
        specificity,
        accuracy: confusion.accuracy(),
        confusion,
        roc,
    })
}

/// Fit `model` on the training partition, pick the Youden cutoff from the
/// training ROC curve and score both partitions against it.
///
/// Input shapes, finiteness and label values are checked before the model
/// is touched.
pub fn evaluate(
    model: &mut dyn Classifier,
    x_train: &FeatureMatrix,
    x_test: &FeatureMatrix,
    y_train: &[u8],
    y_test: &[u8],
) -> Result<MetricsBundle> {
    if !x_train.same_columns(x_test) {
        return Err(EvalError::ShapeMismatch(format!(
            "train columns {:?} differ from test columns {:?}",
            x_train.columns, x_test.columns
        )));
    }
    check_pair(x_train, y_train, Partition::Train)?;
    check_pair(x_test, y_test, Partition::Test)?;

    let name = model.name();
    model.fit(x_train, y_train)?;

    let train_scores = model.positive_scores(x_train)?;
    let train_roc = compute_roc(&train_scores, y_train)?;
    let threshold = select_threshold(&train_roc);
    debug!(model = %name, threshold, "selected cutoff from training ROC");

    let train = partition_metrics(Partition::Train, &train_scores, y_train, threshold, Some(train_roc))?;
    let test_scores = model.positive_scores(x_test)?;
    let test = partition_metrics(Partition::Test, &test_scores, y_test, threshold, None)?;

    debug!(
        model = %name,
        train_auc = train.auc,
        test_auc = test.auc,
        "evaluation finished"
    );

    Ok(MetricsBundle {
        model: name,
        threshold,
        train,
        test,
    })
}
