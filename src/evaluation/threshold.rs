use super::RocCurve;

/// Cutoff maximising Youden's J = TPR - FPR.
///
/// The origin point (threshold `+inf`) is never chosen, so the result is
/// always an observed score. Ties go to the first point, i.e. the highest
/// threshold. The curve is expected to come from [`super::compute_roc`].
pub fn select_threshold(roc: &RocCurve) -> f64 {
    let mut best = 1;
    let mut best_j = f64::NEG_INFINITY;
    for i in 1..roc.len() {
        let j = roc.tpr[i] - roc.fpr[i];
        if j > best_j {
            best_j = j;
            best = i;
        }
    }
    roc.thresholds[best]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::compute_roc;

    #[test]
    fn test_youden_threshold() {
        let roc = compute_roc(&[0.1, 0.4, 0.35, 0.8], &[0, 0, 1, 1]).unwrap();
        // J: 0.8 -> 0.5, 0.4 -> 0.0, 0.35 -> 0.5, 0.1 -> 0.0; first wins
        assert_eq!(select_threshold(&roc), 0.8);
    }

    #[test]
    fn test_constant_scores_select_the_score() {
        let roc = compute_roc(&[0.8; 10], &[0, 0, 0, 1, 1, 1, 1, 1, 1, 1]).unwrap();
        assert_eq!(select_threshold(&roc), 0.8);
    }

    #[test]
    fn test_threshold_is_an_observed_score() {
        let scores = [0.31, 0.72, 0.05, 0.66, 0.49, 0.93, 0.12, 0.58];
        let labels = [0, 1, 0, 1, 0, 1, 1, 0];
        let t = select_threshold(&compute_roc(&scores, &labels).unwrap());
        assert!(scores.contains(&t));
    }
}
