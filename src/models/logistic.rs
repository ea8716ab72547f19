use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use matlib::gauss_elimination;

use super::{
    ClassWeight, Classifier, check_features, check_training_data, proba_pair, sigmoid,
};
use crate::dataset::FeatureMatrix;
use crate::error::{EvalError, Result};

/// L2-penalised logistic regression fitted by Newton-IRLS.
///
/// Minimises `sum_i w_i * logloss_i + ||beta||^2 / (2C)`; the intercept is
/// not penalised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticRegression {
    pub c: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub class_weight: ClassWeight,
    /// Intercept followed by one coefficient per feature
    #[serde(skip)]
    pub(crate) coefficients: Vec<f64>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 100,
            tol: 1e-6,
            class_weight: ClassWeight::None,
            coefficients: Vec::new(),
        }
    }
}

impl LogisticRegression {
    pub fn new(c: f64, max_iter: usize, class_weight: ClassWeight) -> Self {
        Self {
            c,
            max_iter,
            class_weight,
            ..Default::default()
        }
    }

    pub fn intercept(&self) -> Option<f64> {
        self.coefficients.first().copied()
    }

    pub fn coefficients(&self) -> &[f64] {
        self.coefficients.get(1..).unwrap_or(&[])
    }

    fn linear(beta: &[f64], row: &[f64]) -> f64 {
        beta[0] + matlib::dot(&beta[1..], row)
    }

    /// Penalty weight; zero for an unpenalised fit (`c = inf`)
    fn lambda(&self) -> f64 {
        1.0 / self.c
    }

    /// Gradient and row-major Hessian of the penalised loss at `beta`
    fn newton_terms(
        beta: &[f64],
        x: &FeatureMatrix,
        y: &[u8],
        sw: &[f64],
        lambda: f64,
    ) -> (Vec<f64>, Vec<f64>) {
        let p = beta.len();
        let mut grad = vec![0.0; p];
        let mut hess = vec![0.0; p * p];

        for (i, row) in x.rows().enumerate() {
            let mu = sigmoid(Self::linear(beta, row));
            let r = sw[i] * (mu - f64::from(y[i]));
            let h = sw[i] * mu * (1.0 - mu);

            grad[0] += r;
            hess[0] += h;
            for a in 0..row.len() {
                grad[a + 1] += r * row[a];
                hess[a + 1] += h * row[a];
                for b in a..row.len() {
                    hess[(a + 1) * p + b + 1] += h * row[a] * row[b];
                }
            }
        }
        for a in 1..p {
            grad[a] += lambda * beta[a];
            hess[a * p + a] += lambda;
            hess[a * p] = hess[a];
            for b in (a + 1)..p {
                hess[b * p + a] = hess[a * p + b];
            }
        }
        (grad, hess)
    }

    /// Standard errors of the intercept and coefficients, in that order.
    ///
    /// Square roots of the diagonal of the inverse Hessian at the fitted
    /// coefficients, so `x` and `y` must be the training data. For an
    /// unpenalised fit this is the usual Wald standard error.
    pub fn standard_errors(&self, x: &FeatureMatrix, y: &[u8]) -> Result<Vec<f64>> {
        if self.coefficients.is_empty() {
            return Err(EvalError::FitError("Model not fitted".to_string()));
        }
        check_features(self.coefficients.len() - 1, x)?;
        check_training_data(x, y)?;

        let p = self.coefficients.len();
        let sw = self.class_weight.sample_weights(y);
        let (_, hess) = Self::newton_terms(&self.coefficients, x, y, &sw, self.lambda());

        let mut unit = vec![0.0; p];
        (0..p)
            .map(|j| -> Result<f64> {
                unit.fill(0.0);
                unit[j] = 1.0;
                let column = gauss_elimination(&hess, &unit, p)
                    .map_err(|e| EvalError::FitError(format!("singular Hessian: {}", e)))?;
                Ok(column[j].max(0.0).sqrt())
            })
            .collect()
    }

    fn objective(&self, beta: &[f64], x: &FeatureMatrix, y: &[u8], sw: &[f64]) -> f64 {
        let mut loss = 0.0;
        for (i, row) in x.rows().enumerate() {
            let z = Self::linear(beta, row);
            // log(1 + exp(z)) - y z, written to stay finite for large |z|
            let softplus = if z > 0.0 {
                z + (-z).exp().ln_1p()
            } else {
                z.exp().ln_1p()
            };
            loss += sw[i] * (softplus - f64::from(y[i]) * z);
        }
        let penalty: f64 = beta[1..].iter().map(|b| b * b).sum::<f64>() * self.lambda() / 2.0;
        loss + penalty
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> String {
        match self.class_weight {
            ClassWeight::None => "Logistic Regression".to_string(),
            ClassWeight::Balanced => "Logistic Regression (balanced)".to_string(),
        }
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<()> {
        check_training_data(x, y)?;
        if !(self.c > 0.0) {
            return Err(EvalError::FitError(format!("C must be positive, got {}", self.c)));
        }

        let p = x.n_cols() + 1;
        let sw = self.class_weight.sample_weights(y);
        let lambda = self.lambda();
        let mut beta = vec![0.0; p];
        let mut current = self.objective(&beta, x, y, &sw);
        let mut converged = false;

        for iter in 0..self.max_iter {
            let (grad, hess) = Self::newton_terms(&beta, x, y, &sw, lambda);

            let step = gauss_elimination(&hess, &grad, p)
                .map_err(|e| EvalError::FitError(format!("logistic regression: {}", e)))?;

            // Backtrack until the penalised loss stops increasing
            let mut scale = 1.0;
            let mut candidate: Vec<f64>;
            loop {
                candidate = beta.iter().zip(&step).map(|(b, s)| b - scale * s).collect();
                let value = self.objective(&candidate, x, y, &sw);
                if value <= current || scale < 1e-8 {
                    current = value;
                    break;
                }
                scale *= 0.5;
            }

            let max_change = step.iter().fold(0.0_f64, |m, s| m.max((scale * s).abs()));
            beta = candidate;

            if max_change < self.tol {
                debug!(iterations = iter + 1, "logistic regression converged");
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(max_iter = self.max_iter, "logistic regression did not converge");
        }

        self.coefficients = beta;
        Ok(())
    }

    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<[f64; 2]>> {
        check_features(self.coefficients.len().saturating_sub(1), x)?;
        Ok(x
            .rows()
            .map(|row| proba_pair(sigmoid(Self::linear(&self.coefficients, row))))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_data::{accuracy, blobs};

    #[test]
    fn test_logistic_separates_blobs() {
        let (x, y) = blobs(100, 1);
        let mut model = LogisticRegression::default();
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        assert!(accuracy(&proba, &y) > 0.9);
        assert!(model.coefficients().iter().all(|&b| b > 0.0));
    }

    #[test]
    fn test_logistic_intercept_tracks_base_rate() {
        // constant feature, 3 positives out of 4: intercept near logit(0.75)
        let x = FeatureMatrix::from_rows(
            vec!["k".into()],
            &[vec![0.0], vec![0.0], vec![0.0], vec![0.0]],
        )
        .unwrap();
        let mut model = LogisticRegression::default();
        model.fit(&x, &[0, 1, 1, 1]).unwrap();
        assert!((model.intercept().unwrap() - 3.0_f64.ln()).abs() < 1e-5);

        // balanced weights equalise the classes
        let mut balanced = LogisticRegression::new(1.0, 100, ClassWeight::Balanced);
        balanced.fit(&x, &[0, 1, 1, 1]).unwrap();
        assert!(balanced.intercept().unwrap().abs() < 1e-5);
    }

    #[test]
    fn test_unpenalised_fit_matches_log_odds() {
        // x = 0: 10 up, 30 down; x = 1: 30 up, 10 down
        let mut rows = Vec::new();
        let mut y = Vec::new();
        for (value, ups, downs) in [(0.0, 10, 30), (1.0, 30, 10)] {
            for k in 0..ups + downs {
                rows.push(vec![value]);
                y.push(u8::from(k < ups));
            }
        }
        let x = FeatureMatrix::from_rows(vec!["x".into()], &rows).unwrap();

        let mut model = LogisticRegression::new(f64::INFINITY, 100, ClassWeight::None);
        model.fit(&x, &y).unwrap();
        assert!((model.intercept().unwrap() + 3.0_f64.ln()).abs() < 1e-6);
        assert!((model.coefficients()[0] - 2.0 * 3.0_f64.ln()).abs() < 1e-6);

        let se = model.standard_errors(&x, &y).unwrap();
        assert!((se[0] - (1.0 / 10.0 + 1.0 / 30.0_f64).sqrt()).abs() < 1e-6);
        assert!((se[1] - (2.0 / 10.0 + 2.0 / 30.0_f64).sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_standard_errors_need_fit() {
        let (x, y) = blobs(5, 2);
        let model = LogisticRegression::default();
        assert!(matches!(model.standard_errors(&x, &y), Err(EvalError::FitError(_))));
    }

    #[test]
    fn test_logistic_errors() {
        let (x, y) = blobs(5, 2);
        let model = LogisticRegression::default();
        assert!(matches!(model.predict_proba(&x), Err(EvalError::FitError(_))));

        let mut model = LogisticRegression::default();
        assert!(matches!(model.fit(&x, &vec![1; y.len()]), Err(EvalError::FitError(_))));

        model.fit(&x, &y).unwrap();
        let narrow = FeatureMatrix::new(vec!["a".into()], 1, vec![0.0]).unwrap();
        assert!(matches!(model.predict_proba(&narrow), Err(EvalError::ShapeMismatch(_))));
    }
}
