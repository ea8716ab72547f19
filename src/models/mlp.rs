use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Classifier, check_features, check_training_data, proba_pair, sigmoid};
use crate::dataset::FeatureMatrix;
use crate::error::{EvalError, Result};

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const ADAM_EPS: f64 = 1e-8;

/// Fully connected layer, weights stored `fan_in x fan_out` row-major
#[derive(Debug, Clone, PartialEq)]
struct Layer {
    fan_in: usize,
    fan_out: usize,
    weights: Vec<f64>,
    bias: Vec<f64>,
}

impl Layer {
    /// Glorot-uniform initialisation
    fn new(fan_in: usize, fan_out: usize, rng: &mut ChaCha8Rng) -> Self {
        let bound = (6.0 / (fan_in + fan_out) as f64).sqrt();
        Self {
            fan_in,
            fan_out,
            weights: (0..fan_in * fan_out).map(|_| rng.gen_range(-bound..bound)).collect(),
            bias: (0..fan_out).map(|_| rng.gen_range(-bound..bound)).collect(),
        }
    }

    fn forward(&self, input: &[f64], output: &mut Vec<f64>) {
        output.clear();
        output.extend_from_slice(&self.bias);
        for (i, &v) in input.iter().enumerate() {
            if v == 0.0 {
                continue;
            }
            let w = &self.weights[i * self.fan_out..(i + 1) * self.fan_out];
            for (o, wi) in output.iter_mut().zip(w) {
                *o += v * wi;
            }
        }
    }
}

/// Adam moment estimates for one layer
#[derive(Debug, Clone)]
struct Moments {
    m_w: Vec<f64>,
    v_w: Vec<f64>,
    m_b: Vec<f64>,
    v_b: Vec<f64>,
}

impl Moments {
    fn for_layer(layer: &Layer) -> Self {
        Self {
            m_w: vec![0.0; layer.weights.len()],
            v_w: vec![0.0; layer.weights.len()],
            m_b: vec![0.0; layer.bias.len()],
            v_b: vec![0.0; layer.bias.len()],
        }
    }
}

fn adam_update(param: &mut [f64], grad: &[f64], m: &mut [f64], v: &mut [f64], lr: f64) {
    for i in 0..param.len() {
        m[i] = BETA1 * m[i] + (1.0 - BETA1) * grad[i];
        v[i] = BETA2 * v[i] + (1.0 - BETA2) * grad[i] * grad[i];
        param[i] -= lr * m[i] / (v[i].sqrt() + ADAM_EPS);
    }
}

/// Multilayer perceptron: ReLU hidden layers and one logistic output unit,
/// trained on L2-penalised log-loss with mini-batch Adam.
///
/// Training stops after `max_iter` epochs, or once the epoch loss has failed
/// to improve by `tol` for `n_iter_no_change` consecutive epochs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultilayerPerceptron {
    pub hidden: Vec<usize>,
    pub alpha: f64,
    pub learning_rate: f64,
    pub batch_size: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub n_iter_no_change: usize,
    pub seed: u64,
    #[serde(skip)]
    pub(crate) layers: Vec<Layer>,
}

impl Default for MultilayerPerceptron {
    fn default() -> Self {
        Self {
            hidden: vec![100],
            alpha: 1e-4,
            learning_rate: 1e-3,
            batch_size: 200,
            max_iter: 200,
            tol: 1e-4,
            n_iter_no_change: 10,
            seed: 0,
            layers: Vec::new(),
        }
    }
}

impl MultilayerPerceptron {
    /// Activations of every layer for one row; the last holds the output logit
    fn forward(&self, row: &[f64], activations: &mut Vec<Vec<f64>>) {
        activations.resize(self.layers.len() + 1, Vec::new());
        activations[0].clear();
        activations[0].extend_from_slice(row);

        let last = self.layers.len() - 1;
        for (l, layer) in self.layers.iter().enumerate() {
            let (done, rest) = activations.split_at_mut(l + 1);
            layer.forward(&done[l], &mut rest[0]);
            if l < last {
                for v in rest[0].iter_mut() {
                    *v = v.max(0.0);
                }
            }
        }
    }

    fn predict_one(&self, row: &[f64], activations: &mut Vec<Vec<f64>>) -> f64 {
        self.forward(row, activations);
        sigmoid(activations[self.layers.len()][0])
    }
}

impl Classifier for MultilayerPerceptron {
    fn name(&self) -> String {
        "MLP".to_string()
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<()> {
        check_training_data(x, y)?;
        if self.hidden.iter().any(|&h| h == 0) || self.batch_size == 0 {
            return Err(EvalError::FitError(
                "hidden layer sizes and batch size must be positive".to_string(),
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut sizes = vec![x.n_cols()];
        sizes.extend(&self.hidden);
        sizes.push(1);
        self.layers = sizes.windows(2).map(|w| Layer::new(w[0], w[1], &mut rng)).collect();

        let n = x.n_rows;
        let batch = self.batch_size.min(n);
        let n_layers = self.layers.len();

        let mut moments: Vec<Moments> = self.layers.iter().map(Moments::for_layer).collect();
        let mut grads_w: Vec<Vec<f64>> = self.layers.iter().map(|l| vec![0.0; l.weights.len()]).collect();
        let mut grads_b: Vec<Vec<f64>> = self.layers.iter().map(|l| vec![0.0; l.bias.len()]).collect();
        let mut activations: Vec<Vec<f64>> = Vec::new();
        let mut deltas: Vec<Vec<f64>> = vec![Vec::new(); n_layers];

        let mut order: Vec<usize> = (0..n).collect();
        let mut step = 0i32;
        let mut best_loss = f64::INFINITY;
        let mut no_improvement = 0usize;
        let mut converged = false;

        for epoch in 0..self.max_iter {
            order.shuffle(&mut rng);
            let mut epoch_loss = 0.0;

            for chunk in order.chunks(batch) {
                let m = chunk.len() as f64;
                grads_w.iter_mut().for_each(|g| g.fill(0.0));
                grads_b.iter_mut().for_each(|g| g.fill(0.0));

                for &i in chunk {
                    let p = self.predict_one(x.row(i), &mut activations);
                    let target = f64::from(y[i]);
                    let pc = p.clamp(1e-15, 1.0 - 1e-15);
                    epoch_loss -= target * pc.ln() + (1.0 - target) * (1.0 - pc).ln();

                    // Backpropagate from the logistic output
                    deltas[n_layers - 1].clear();
                    deltas[n_layers - 1].push(p - target);
                    for l in (0..n_layers).rev() {
                        let layer = &self.layers[l];
                        let input = &activations[l];
                        for (a, &inp) in input.iter().enumerate() {
                            if inp == 0.0 {
                                continue;
                            }
                            let row = &mut grads_w[l][a * layer.fan_out..(a + 1) * layer.fan_out];
                            for (g, d) in row.iter_mut().zip(&deltas[l]) {
                                *g += inp * d;
                            }
                        }
                        for (g, d) in grads_b[l].iter_mut().zip(&deltas[l]) {
                            *g += d;
                        }

                        if l > 0 {
                            let mut prev = vec![0.0; layer.fan_in];
                            for (a, slot) in prev.iter_mut().enumerate() {
                                if activations[l][a] <= 0.0 {
                                    continue;
                                }
                                let w = &layer.weights[a * layer.fan_out..(a + 1) * layer.fan_out];
                                *slot = w.iter().zip(&deltas[l]).map(|(w, d)| w * d).sum();
                            }
                            deltas[l - 1] = prev;
                        }
                    }
                }

                // Mean gradient plus the L2 term, then one Adam step
                step += 1;
                let lr = self.learning_rate * (1.0 - BETA2.powi(step)).sqrt()
                    / (1.0 - BETA1.powi(step));
                let mut penalty = 0.0;
                for (l, layer) in self.layers.iter_mut().enumerate() {
                    penalty += layer.weights.iter().map(|w| w * w).sum::<f64>();
                    for (g, w) in grads_w[l].iter_mut().zip(&layer.weights) {
                        *g = *g / m + self.alpha * w / m;
                    }
                    for g in grads_b[l].iter_mut() {
                        *g /= m;
                    }
                    let mo = &mut moments[l];
                    adam_update(&mut layer.weights, &grads_w[l], &mut mo.m_w, &mut mo.v_w, lr);
                    adam_update(&mut layer.bias, &grads_b[l], &mut mo.m_b, &mut mo.v_b, lr);
                }
                epoch_loss += 0.5 * self.alpha * penalty;
            }

            let loss = epoch_loss / n as f64;
            if loss > best_loss - self.tol {
                no_improvement += 1;
            } else {
                no_improvement = 0;
            }
            best_loss = best_loss.min(loss);

            if no_improvement > self.n_iter_no_change {
                debug!(epochs = epoch + 1, loss, "mlp training stalled, stopping");
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(max_iter = self.max_iter, best_loss, "mlp reached max_iter");
        }
        Ok(())
    }

    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<[f64; 2]>> {
        let n_features = self.layers.first().map_or(0, |l| l.fan_in);
        check_features(n_features, x)?;

        let mut activations = Vec::new();
        Ok(x
            .rows()
            .map(|row| proba_pair(self.predict_one(row, &mut activations)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_data::{accuracy, blobs};

    #[test]
    fn test_mlp_separates_blobs() {
        let (x, y) = blobs(100, 10);
        let mut model = MultilayerPerceptron {
            hidden: vec![16],
            learning_rate: 0.01,
            max_iter: 300,
            seed: 1337,
            ..Default::default()
        };
        model.fit(&x, &y).unwrap();
        assert!(accuracy(&model.predict_proba(&x).unwrap(), &y) > 0.9);
    }

    #[test]
    fn test_mlp_learns_xor() {
        let rows = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]];
        let x = FeatureMatrix::from_rows(vec!["a".into(), "b".into()], &rows).unwrap();
        let y = vec![0, 1, 1, 0];
        let mut model = MultilayerPerceptron {
            hidden: vec![16],
            alpha: 0.0,
            learning_rate: 0.05,
            max_iter: 2000,
            tol: 0.0,
            n_iter_no_change: 2000,
            seed: 3,
            ..Default::default()
        };
        model.fit(&x, &y).unwrap();
        assert_eq!(accuracy(&model.predict_proba(&x).unwrap(), &y), 1.0);
    }

    #[test]
    fn test_mlp_is_reproducible() {
        let (x, y) = blobs(30, 11);
        let make = || MultilayerPerceptron {
            hidden: vec![4],
            max_iter: 20,
            seed: 5,
            ..Default::default()
        };
        let mut a = make();
        let mut b = make();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }
}
