use serde::{Deserialize, Serialize};

use stats::{mean, variance};

use super::Classifier;
use crate::dataset::FeatureMatrix;
use crate::error::{EvalError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scaler {
    /// Zero mean, unit (population) variance
    Standard,
    /// Map each feature's training range onto [0, 1]
    MinMax,
}

/// Per-feature affine transform `(v - offset) / scale`
#[derive(Debug, Clone, PartialEq)]
pub struct FittedScaler {
    offset: Vec<f64>,
    scale: Vec<f64>,
}

impl Scaler {
    pub fn fit(&self, x: &FeatureMatrix) -> FittedScaler {
        let mut offset = Vec::with_capacity(x.n_cols());
        let mut scale = Vec::with_capacity(x.n_cols());

        for k in 0..x.n_cols() {
            let column = x.column(k);
            let (o, s) = match self {
                Scaler::Standard => (mean(&column), variance(&column, 0).sqrt()),
                Scaler::MinMax => {
                    let lo = column.iter().copied().fold(f64::INFINITY, f64::min);
                    let hi = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    (lo, hi - lo)
                }
            };
            offset.push(o);
            // constant features are left centred but unscaled
            scale.push(if s > 0.0 && s.is_finite() { s } else { 1.0 });
        }

        FittedScaler { offset, scale }
    }
}

impl FittedScaler {
    pub fn transform(&self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        if x.n_cols() != self.offset.len() {
            return Err(EvalError::ShapeMismatch(format!(
                "scaler was fitted on {} features, got {}",
                self.offset.len(),
                x.n_cols()
            )));
        }

        let n = self.offset.len();
        let data = x
            .data
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let k = i % n;
                (v - self.offset[k]) / self.scale[k]
            })
            .collect();
        FeatureMatrix::new(x.columns.clone(), x.n_rows, data)
    }
}

/// A classifier that sees scaled features.
///
/// The scaler is fitted on the rows passed to `fit` and reused for every
/// later `predict_proba`, so test rows never influence the transform.
pub struct Scaled<M> {
    scaler: Scaler,
    fitted: Option<FittedScaler>,
    inner: M,
}

impl<M: Classifier> Scaled<M> {
    pub fn new(scaler: Scaler, inner: M) -> Self {
        Self {
            scaler,
            fitted: None,
            inner,
        }
    }
}

impl<M: Classifier> Classifier for Scaled<M> {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<()> {
        let fitted = self.scaler.fit(x);
        let scaled = fitted.transform(x)?;
        self.inner.fit(&scaled, y)?;
        self.fitted = Some(fitted);
        Ok(())
    }

    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<[f64; 2]>> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| EvalError::FitError("model has not been fitted".to_string()))?;
        self.inner.predict_proba(&fitted.transform(x)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KNearestNeighbors;

    fn matrix() -> FeatureMatrix {
        FeatureMatrix::from_rows(
            vec!["a".into(), "b".into()],
            &[vec![1.0, 10.0], vec![2.0, 10.0], vec![3.0, 10.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_standard_scaler() {
        let x = matrix();
        let t = Scaler::Standard.fit(&x).transform(&x).unwrap();
        let a = t.column(0);
        let sd = (2.0_f64 / 3.0).sqrt();
        assert!((a[0] + 1.0 / sd).abs() < 1e-12);
        assert!(a[1].abs() < 1e-12);
        // constant column centred, not blown up
        assert_eq!(t.column(1), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_min_max_scaler_uses_training_range() {
        let x = matrix();
        let fitted = Scaler::MinMax.fit(&x);
        assert_eq!(fitted.transform(&x).unwrap().column(0), vec![0.0, 0.5, 1.0]);

        let wider = FeatureMatrix::from_rows(vec!["a".into(), "b".into()], &[vec![5.0, 10.0]]).unwrap();
        assert_eq!(fitted.transform(&wider).unwrap().row(0), &[2.0, 0.0]);
    }

    #[test]
    fn test_scaled_classifier_requires_fit() {
        let model = Scaled::new(Scaler::Standard, KNearestNeighbors::new(1));
        assert!(matches!(model.predict_proba(&matrix()), Err(EvalError::FitError(_))));
    }
}
