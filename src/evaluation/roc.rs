use serde::Serialize;

use super::round_to;
use crate::error::{EvalError, Result};

/// Receiver operating characteristic of a score vector.
///
/// Point 0 is the origin with threshold `+inf`; every following point
/// corresponds to one distinct score, in decreasing order, and counts rows
/// scoring at or above it as positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}

pub fn compute_roc(scores: &[f64], labels: &[u8]) -> Result<RocCurve> {
    if scores.len() != labels.len() {
        return Err(EvalError::ShapeMismatch(format!(
            "{} scores but {} labels",
            scores.len(),
            labels.len()
        )));
    }
    if scores.is_empty() {
        return Err(EvalError::DegenerateInput("no rows to build a ROC curve from".to_string()));
    }
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(EvalError::DegenerateInput("non-finite score".to_string()));
    }
    if labels.iter().any(|&l| l > 1) {
        return Err(EvalError::DegenerateInput("labels must be 0 or 1".to_string()));
    }

    let positives = labels.iter().filter(|&&l| l == 1).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(EvalError::DegenerateInput(
            "ROC curve needs both classes".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut roc = RocCurve {
        fpr: vec![0.0],
        tpr: vec![0.0],
        thresholds: vec![f64::INFINITY],
    };
    let (p, n) = (positives as f64, negatives as f64);
    let (mut tp, mut fp) = (0usize, 0usize);

    for (k, &i) in order.iter().enumerate() {
        if labels[i] == 1 {
            tp += 1;
        } else {
            fp += 1;
        }
        // emit once all rows sharing this score are counted
        let last_of_score = order.get(k + 1).is_none_or(|&j| scores[j] != scores[i]);
        if last_of_score {
            roc.fpr.push(fp as f64 / n);
            roc.tpr.push(tp as f64 / p);
            roc.thresholds.push(scores[i]);
        }
    }

    Ok(roc)
}

/// Trapezoidal area under the curve
pub fn auc(roc: &RocCurve) -> f64 {
    stats::trapezoid(&roc.fpr, &roc.tpr)
}

/// ROC AUC of a score vector, rounded to 3 decimal places
pub fn roc_auc(scores: &[f64], labels: &[u8]) -> Result<f64> {
    Ok(round_to(auc(&compute_roc(scores, labels)?), 3))
}
