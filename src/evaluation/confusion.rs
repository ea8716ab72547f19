use serde::Serialize;

use super::{Partition, round_to};
use crate::error::{EvalError, Result};

/// Two-by-two table of counts, `counts[predicted][actual]`, class 0 first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionTable {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionTable {
    pub fn tp(&self) -> usize {
        self.counts[1][1]
    }

    pub fn tn(&self) -> usize {
        self.counts[0][0]
    }

    pub fn fp(&self) -> usize {
        self.counts[1][0]
    }

    pub fn fn_(&self) -> usize {
        self.counts[0][1]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Actual rows of `class`
    pub fn support(&self, class: usize) -> usize {
        self.counts[0][class] + self.counts[1][class]
    }

    /// Rows predicted as `class`
    pub fn predicted(&self, class: usize) -> usize {
        self.counts[class][0] + self.counts[class][1]
    }

    /// TP / (TP + FN) in percent, 2 decimal places
    pub fn sensitivity(&self, partition: Partition) -> Result<f64> {
        let denom = self.tp() + self.fn_();
        if denom == 0 {
            return Err(EvalError::UndefinedMetric {
                metric: "sensitivity",
                partition,
            });
        }
        Ok(round_to(self.tp() as f64 / denom as f64 * 100.0, 2))
    }

    /// TN / (TN + FP) in percent, 2 decimal places
    pub fn specificity(&self, partition: Partition) -> Result<f64> {
        let denom = self.tn() + self.fp();
        if denom == 0 {
            return Err(EvalError::UndefinedMetric {
                metric: "specificity",
                partition,
            });
        }
        Ok(round_to(self.tn() as f64 / denom as f64 * 100.0, 2))
    }

    /// Fraction of rows classified correctly; NaN for an empty table
    pub fn accuracy(&self) -> f64 {
        (self.tp() + self.tn()) as f64 / self.total() as f64
    }
}

/// Tally predictions `score > threshold` against the labels
pub fn confusion_counts(scores: &[f64], labels: &[u8], threshold: f64) -> ConfusionTable {
    let mut table = ConfusionTable::default();
    for (&s, &l) in scores.iter().zip(labels) {
        let predicted = usize::from(s > threshold);
        table.counts[predicted][usize::from(l)] += 1;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_layout() {
        let scores = [0.9, 0.2, 0.7, 0.4, 0.5];
        let labels = [1, 0, 0, 1, 1];
        let t = confusion_counts(&scores, &labels, 0.5);

        assert_eq!(t.counts, [[1, 2], [1, 1]]);
        assert_eq!((t.tp(), t.tn(), t.fp(), t.fn_()), (1, 1, 1, 2));
        assert_eq!(t.total(), 5);
        assert_eq!(t.support(1), 3);
        assert_eq!(t.predicted(1), 2);
        assert_eq!(t.sensitivity(Partition::Train).unwrap(), 33.33);
        assert_eq!(t.specificity(Partition::Train).unwrap(), 50.0);
        assert_eq!(t.accuracy(), 0.4);
    }

    #[test]
    fn test_score_equal_to_threshold_is_negative() {
        let t = confusion_counts(&[0.5, 0.5], &[1, 0], 0.5);
        assert_eq!(t.tp(), 0);
        assert_eq!(t.tn(), 1);
    }

    #[test]
    fn test_scores_equal_to_labels() {
        let labels = [0, 1, 1, 0, 1, 0, 0];
        let scores: Vec<f64> = labels.iter().map(|&l| f64::from(l)).collect();
        assert_eq!(crate::evaluation::roc_auc(&scores, &labels).unwrap(), 1.0);

        for threshold in [0.01, 0.5, 0.99] {
            let t = confusion_counts(&scores, &labels, threshold);
            assert_eq!(t.sensitivity(Partition::Test).unwrap(), 100.0);
            assert_eq!(t.specificity(Partition::Test).unwrap(), 100.0);
        }
    }

    #[test]
    fn test_undefined_metrics() {
        let t = confusion_counts(&[0.9, 0.1], &[0, 0], 0.5);
        assert!(matches!(
            t.sensitivity(Partition::Test),
            Err(EvalError::UndefinedMetric {
                metric: "sensitivity",
                partition: Partition::Test
            })
        ));
        assert_eq!(t.specificity(Partition::Test).unwrap(), 50.0);
    }
}
