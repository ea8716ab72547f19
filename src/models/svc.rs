use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Classifier, check_features, check_training_data, proba_pair};
use crate::dataset::FeatureMatrix;
use crate::error::{EvalError, Result};

/// Linear support vector classifier with Platt-scaled probabilities.
///
/// The hinge-loss dual is solved by coordinate descent with the bias folded
/// in as a constant feature. A sigmoid `1 / (1 + exp(A f + B))` is then
/// fitted to the training decision values `f`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearSvc {
    pub c: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub seed: u64,
    #[serde(skip)]
    pub(crate) weights: Vec<f64>,
    #[serde(skip)]
    pub(crate) bias: f64,
    #[serde(skip)]
    pub(crate) platt: (f64, f64),
}

impl Default for LinearSvc {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tol: 1e-4,
            seed: 0,
            weights: Vec::new(),
            bias: 0.0,
            platt: (0.0, 0.0),
        }
    }
}

impl LinearSvc {
    pub fn decision_function(&self, row: &[f64]) -> f64 {
        matlib::dot(&self.weights, row) + self.bias
    }

    fn solve_dual(&mut self, x: &FeatureMatrix, y: &[u8]) {
        let n = x.n_rows;
        let d = x.n_cols();
        let sign: Vec<f64> = y.iter().map(|&l| if l == 1 { 1.0 } else { -1.0 }).collect();
        // squared norms include the constant bias feature
        let q_diag: Vec<f64> = x.rows().map(|r| matlib::dot(r, r) + 1.0).collect();

        let mut alpha = vec![0.0; n];
        let mut w = vec![0.0; d];
        let mut b = 0.0;
        let mut order: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut converged = false;

        for epoch in 0..self.max_iter {
            order.shuffle(&mut rng);
            let mut pg_max = f64::NEG_INFINITY;
            let mut pg_min = f64::INFINITY;

            for &i in &order {
                let row = x.row(i);
                let g = sign[i] * (matlib::dot(&w, row) + b) - 1.0;
                let pg = if alpha[i] == 0.0 {
                    g.min(0.0)
                } else if alpha[i] == self.c {
                    g.max(0.0)
                } else {
                    g
                };
                pg_max = pg_max.max(pg);
                pg_min = pg_min.min(pg);

                if pg.abs() > 1e-12 {
                    let old = alpha[i];
                    alpha[i] = (old - g / q_diag[i]).clamp(0.0, self.c);
                    let delta = (alpha[i] - old) * sign[i];
                    for (wk, xk) in w.iter_mut().zip(row) {
                        *wk += delta * xk;
                    }
                    b += delta;
                }
            }

            if pg_max - pg_min < self.tol {
                debug!(epochs = epoch + 1, "linear svc converged");
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(max_iter = self.max_iter, "linear svc did not converge");
        }

        self.weights = w;
        self.bias = b;
    }
}

/// Fit `P(y = 1 | f) = 1 / (1 + exp(A f + B))` by Newton's method with
/// backtracking, using regularised targets to avoid overfitting the extremes.
pub(crate) fn platt_scaling(decision: &[f64], y: &[u8]) -> (f64, f64) {
    const MAX_ITER: usize = 100;
    const MIN_STEP: f64 = 1e-10;
    const SIGMA: f64 = 1e-12;
    const EPS: f64 = 1e-5;

    let prior1 = y.iter().filter(|&&l| l == 1).count() as f64;
    let prior0 = y.len() as f64 - prior1;
    let hi = (prior1 + 1.0) / (prior1 + 2.0);
    let lo = 1.0 / (prior0 + 2.0);
    let t: Vec<f64> = y.iter().map(|&l| if l == 1 { hi } else { lo }).collect();

    let objective = |a: f64, b: f64| -> f64 {
        decision
            .iter()
            .zip(&t)
            .map(|(&f, &ti)| {
                let z = f * a + b;
                if z >= 0.0 {
                    ti * z + (-z).exp().ln_1p()
                } else {
                    (ti - 1.0) * z + z.exp().ln_1p()
                }
            })
            .sum()
    };

    let mut a = 0.0;
    let mut b = ((prior0 + 1.0) / (prior1 + 1.0)).ln();
    let mut fval = objective(a, b);

    for _ in 0..MAX_ITER {
        let (mut h11, mut h22, mut h21, mut g1, mut g2) = (SIGMA, SIGMA, 0.0, 0.0, 0.0);
        for (&f, &ti) in decision.iter().zip(&t) {
            let z = f * a + b;
            let (p, q) = if z >= 0.0 {
                let e = (-z).exp();
                (e / (1.0 + e), 1.0 / (1.0 + e))
            } else {
                let e = z.exp();
                (1.0 / (1.0 + e), e / (1.0 + e))
            };
            let d2 = p * q;
            h11 += f * f * d2;
            h22 += d2;
            h21 += f * d2;
            let d1 = ti - p;
            g1 += f * d1;
            g2 += d1;
        }

        if g1.abs() < EPS && g2.abs() < EPS {
            break;
        }

        let det = h11 * h22 - h21 * h21;
        let da = -(h22 * g1 - h21 * g2) / det;
        let db = -(-h21 * g1 + h11 * g2) / det;
        let gd = g1 * da + g2 * db;

        let mut step = 1.0;
        while step >= MIN_STEP {
            let (na, nb) = (a + step * da, b + step * db);
            let nf = objective(na, nb);
            if nf < fval + 1e-4 * step * gd {
                a = na;
                b = nb;
                fval = nf;
                break;
            }
            step /= 2.0;
        }
        if step < MIN_STEP {
            break;
        }
    }

    (a, b)
}

fn platt_probability(f: f64, (a, b): (f64, f64)) -> f64 {
    let z = f * a + b;
    if z >= 0.0 {
        let e = (-z).exp();
        e / (1.0 + e)
    } else {
        1.0 / (1.0 + z.exp())
    }
}

impl Classifier for LinearSvc {
    fn name(&self) -> String {
        "SVC".to_string()
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<()> {
        check_training_data(x, y)?;
        if !(self.c > 0.0) {
            return Err(EvalError::FitError(format!("C must be positive, got {}", self.c)));
        }

        self.solve_dual(x, y);
        let decision: Vec<f64> = x.rows().map(|r| self.decision_function(r)).collect();
        self.platt = platt_scaling(&decision, y);
        debug!(a = self.platt.0, b = self.platt.1, "platt scaling fitted");
        Ok(())
    }

    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<[f64; 2]>> {
        check_features(self.weights.len(), x)?;
        Ok(x
            .rows()
            .map(|r| proba_pair(platt_probability(self.decision_function(r), self.platt)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_data::{accuracy, blobs};

    #[test]
    fn test_svc_separates_blobs() {
        let (x, y) = blobs(100, 9);
        let mut model = LinearSvc::default();
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        assert!(accuracy(&proba, &y) > 0.9);
        // larger margins map to higher positive probability
        let far = FeatureMatrix::from_rows(
            vec!["a".into(), "b".into()],
            &[vec![-3.0, -3.0], vec![3.0, 3.0]],
        )
        .unwrap();
        let p = model.predict_proba(&far).unwrap();
        assert!(p[0][1] < 0.1);
        assert!(p[1][1] > 0.9);
    }

    #[test]
    fn test_platt_scaling_is_monotone_increasing() {
        let decision = vec![-2.0, -1.0, -0.5, 0.5, 1.0, 2.0];
        let y = vec![0, 0, 1, 0, 1, 1];
        let (a, _) = platt_scaling(&decision, &y);
        assert!(a < 0.0);
    }
}
