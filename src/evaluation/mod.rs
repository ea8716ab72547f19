//! Model evaluation and imbalance-remedy comparison.
//!
//! A classifier is fitted once on the training partition, a single cutoff is
//! chosen from the training ROC curve by Youden's J, and both partitions are
//! scored against that same cutoff. Nothing here performs I/O; rendering
//! lives in [`crate::report`].

mod confusion;
mod engine;
mod remedy;
mod roc;
mod threshold;

pub use confusion::{ConfusionTable, confusion_counts};
pub use engine::{MetricsBundle, Partition, PartitionMetrics, evaluate};
pub use remedy::{RemedyOutcome, evaluate_with_remedy};
pub use roc::{RocCurve, auc, compute_roc, roc_auc};
pub use threshold::select_threshold;

/// Round half away from zero to `dp` decimal places
pub(crate) fn round_to(value: f64, dp: i32) -> f64 {
    let scale = 10f64.powi(dp);
    (value * scale).round() / scale
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.12345, 3), 0.123);
        assert_eq!(round_to(66.666_666, 2), 66.67);
        assert_eq!(round_to(100.0, 2), 100.0);
    }
}
