use serde::Serialize;
use tracing::debug;

use super::{MetricsBundle, evaluate};
use crate::dataset::{FeatureMatrix, SplitConfig, class_counts, train_test_split};
use crate::error::Result;
use crate::models::Classifier;
use crate::resampling::Resampler;

/// Result of evaluating one imbalance remedy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemedyOutcome {
    /// Short id: resampler name, `"none"` or `"balanced"`
    pub remedy: String,
    pub model: String,
    pub n_train_before: usize,
    pub n_train_after: usize,
    /// Training class counts after resampling, `[negatives, positives]`
    pub train_class_counts: [usize; 2],
    /// Source rows of the test partition
    #[serde(skip)]
    pub test_rows: Vec<usize>,
    pub bundle: MetricsBundle,
}

/// Split once, rebalance the training partition only, then evaluate.
pub fn evaluate_with_remedy(
    resampler: Option<&mut dyn Resampler>,
    model: &mut dyn Classifier,
    x: &FeatureMatrix,
    y: &[u8],
    split: &SplitConfig,
) -> Result<RemedyOutcome> {
    let parts = train_test_split(x, y, split)?;
    let n_train_before = parts.y_train.len();

    let (remedy, x_train, y_train) = match resampler {
        Some(r) => {
            let (xr, yr) = r.fit_resample(&parts.x_train, &parts.y_train)?;
            (r.name(), xr, yr)
        }
        None => ("none".to_string(), parts.x_train, parts.y_train),
    };
    let train_class_counts = class_counts(&y_train);
    debug!(
        remedy = %remedy,
        before = n_train_before,
        after = y_train.len(),
        negatives = train_class_counts[0],
        positives = train_class_counts[1],
        "training partition prepared"
    );

    let bundle = evaluate(model, &x_train, &parts.x_test, &y_train, &parts.y_test)?;

    Ok(RemedyOutcome {
        remedy,
        model: bundle.model.clone(),
        n_train_before,
        n_train_after: y_train.len(),
        train_class_counts,
        test_rows: parts.test_rows,
        bundle,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::evaluation::test_support::ColumnScore;
    use crate::models::{ClassWeight, LogisticRegression};
    use crate::resampling::{RandomOverSampler, RandomUnderSampler, Smote};

    /// Remembers every matrix it is asked to score
    struct Recorder {
        inner: ColumnScore,
        seen: RefCell<Vec<FeatureMatrix>>,
    }

    impl Classifier for Recorder {
        fn name(&self) -> String {
            self.inner.name()
        }

        fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<()> {
            self.inner.fit(x, y)
        }

        fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<[f64; 2]>> {
            self.seen.borrow_mut().push(x.clone());
            self.inner.predict_proba(x)
        }
    }

    /// 60 rows, two positives in five; column 0 is a noisy score
    fn imbalanced() -> (FeatureMatrix, Vec<u8>) {
        let mut data = Vec::new();
        let mut y = Vec::new();
        for i in 0..60 {
            let label = u8::from(i % 5 < 2);
            let score = if label == 1 { 0.6 } else { 0.3 } + ((i * 37) % 11) as f64 * 0.03;
            data.extend_from_slice(&[score, (i % 7) as f64]);
            y.push(label);
        }
        let x = FeatureMatrix::new(vec!["score".into(), "noise".into()], 60, data).unwrap();
        (x, y)
    }

    #[test]
    fn test_remedies_never_touch_the_test_partition() {
        let (x, y) = imbalanced();
        let split = SplitConfig::default();
        let expected = train_test_split(&x, &y, &split).unwrap();

        let mut resamplers: Vec<Option<Box<dyn Resampler>>> = vec![
            None,
            Some(Box::new(RandomUnderSampler::new(0))),
            Some(Box::new(RandomOverSampler::new(0))),
            Some(Box::new(Smote::new(3, 0))),
        ];

        for resampler in resamplers.iter_mut() {
            let mut model = Recorder {
                inner: ColumnScore::new(0),
                seen: RefCell::new(Vec::new()),
            };
            let outcome = match resampler {
                Some(r) => evaluate_with_remedy(Some(r.as_mut()), &mut model, &x, &y, &split),
                None => evaluate_with_remedy(None, &mut model, &x, &y, &split),
            }
            .unwrap();

            assert_eq!(outcome.test_rows, expected.test_rows);
            assert_eq!(outcome.bundle.test.n_rows, expected.y_test.len());
            let seen = model.seen.borrow();
            assert_eq!(seen.last().unwrap(), &expected.x_test, "{}", outcome.remedy);
        }
    }

    #[test]
    fn test_outcome_counts() {
        let (x, y) = imbalanced();
        let split = SplitConfig::default();
        let mut model = ColumnScore::new(0);

        let none = evaluate_with_remedy(None, &mut model, &x, &y, &split).unwrap();
        assert_eq!(none.remedy, "none");
        assert_eq!(none.n_train_before, 48);
        assert_eq!(none.n_train_after, 48);

        let mut over = RandomOverSampler::new(0);
        let outcome = evaluate_with_remedy(Some(&mut over), &mut model, &x, &y, &split).unwrap();
        assert_eq!(outcome.remedy, "RandomOverSampler");
        assert_eq!(outcome.train_class_counts[0], outcome.train_class_counts[1]);
        assert_eq!(outcome.n_train_after, 2 * outcome.train_class_counts[0]);

        let mut under = RandomUnderSampler::new(0);
        let outcome = evaluate_with_remedy(Some(&mut under), &mut model, &x, &y, &split).unwrap();
        assert_eq!(outcome.train_class_counts[0], outcome.train_class_counts[1]);
        assert!(outcome.n_train_after < outcome.n_train_before);
    }

    #[test]
    fn test_balanced_weights_without_resampler() {
        let (x, y) = imbalanced();
        let mut model = LogisticRegression::new(1.0, 1000, ClassWeight::Balanced);
        let outcome = evaluate_with_remedy(None, &mut model, &x, &y, &SplitConfig::default()).unwrap();
        assert_eq!(outcome.remedy, "none");
        assert!(outcome.bundle.model.contains("balanced"));
        assert!(outcome.bundle.test.auc > 0.5);
    }
}
