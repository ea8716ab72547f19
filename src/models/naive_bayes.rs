use serde::{Deserialize, Serialize};

use stats::{log_sum_exp, mean, normal_log_pdf, variance};

use super::{Classifier, check_features, check_training_data};
use crate::dataset::FeatureMatrix;
use crate::error::Result;

/// Gaussian naive Bayes with empirical class priors.
///
/// Every per-class variance is inflated by `var_smoothing` times the largest
/// feature variance so that constant features do not divide by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussianNaiveBayes {
    pub var_smoothing: f64,
    #[serde(skip)]
    means: [Vec<f64>; 2],
    #[serde(skip)]
    variances: [Vec<f64>; 2],
    #[serde(skip)]
    log_priors: [f64; 2],
}

impl Default for GaussianNaiveBayes {
    fn default() -> Self {
        Self {
            var_smoothing: 1e-9,
            means: [Vec::new(), Vec::new()],
            variances: [Vec::new(), Vec::new()],
            log_priors: [0.0; 2],
        }
    }
}

impl Classifier for GaussianNaiveBayes {
    fn name(&self) -> String {
        "Naive Bayes".to_string()
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<()> {
        let counts = check_training_data(x, y)?;
        let n = y.len() as f64;

        let max_var = (0..x.n_cols())
            .map(|k| variance(&x.column(k), 0))
            .fold(0.0_f64, f64::max);
        let epsilon = (self.var_smoothing * max_var).max(f64::MIN_POSITIVE);

        for class in 0..2u8 {
            let rows: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
            let subset = x.select_rows(&rows);

            let c = class as usize;
            self.means[c] = (0..x.n_cols()).map(|k| mean(&subset.column(k))).collect();
            self.variances[c] = (0..x.n_cols())
                .map(|k| variance(&subset.column(k), 0) + epsilon)
                .collect();
            self.log_priors[c] = (counts[c] as f64 / n).ln();
        }

        Ok(())
    }

    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<[f64; 2]>> {
        check_features(self.means[0].len(), x)?;

        Ok(x
            .rows()
            .map(|row| {
                let mut jll = [0.0; 2];
                for (c, slot) in jll.iter_mut().enumerate() {
                    *slot = self.log_priors[c]
                        + row
                            .iter()
                            .zip(&self.means[c])
                            .zip(&self.variances[c])
                            .map(|((&v, &m), &var)| normal_log_pdf(v, m, var))
                            .sum::<f64>();
                }
                let norm = log_sum_exp(&jll);
                [(jll[0] - norm).exp(), (jll[1] - norm).exp()]
            })
            .collect())
    }
}
