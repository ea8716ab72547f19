use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::FeatureMatrix;
use crate::error::{EvalError, Result};

/// Parameters of the shuffled train/test partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    #[serde(default = "default_split_seed")]
    pub seed: u64,
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_split_seed() -> u64 {
    1337
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            seed: default_split_seed(),
        }
    }
}

/// Training and test partitions plus the source rows behind each.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub x_train: FeatureMatrix,
    pub x_test: FeatureMatrix,
    pub y_train: Vec<u8>,
    pub y_test: Vec<u8>,
    pub train_rows: Vec<usize>,
    pub test_rows: Vec<usize>,
}

/// Shuffle row indices with the configured seed and cut off the test set.
///
/// The first `ceil(test_fraction * n)` shuffled rows form the test set and
/// the rest form the training set. The same seed always gives the same split.
pub fn train_test_split(x: &FeatureMatrix, y: &[u8], cfg: &SplitConfig) -> Result<TrainTestSplit> {
    let n = x.n_rows;
    if y.len() != n {
        return Err(EvalError::ShapeMismatch(format!(
            "{} feature rows but {} labels",
            n,
            y.len()
        )));
    }
    if !(cfg.test_fraction > 0.0 && cfg.test_fraction < 1.0) {
        return Err(EvalError::DegenerateInput(format!(
            "test fraction must lie in (0, 1), got {}",
            cfg.test_fraction
        )));
    }

    let n_test = (cfg.test_fraction * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(EvalError::DegenerateInput(format!(
            "cannot split {} rows with test fraction {}",
            n, cfg.test_fraction
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);
    order.shuffle(&mut rng);

    let test_rows = order[..n_test].to_vec();
    let train_rows = order[n_test..].to_vec();

    Ok(TrainTestSplit {
        x_train: x.select_rows(&train_rows),
        x_test: x.select_rows(&test_rows),
        y_train: train_rows.iter().map(|&i| y[i]).collect(),
        y_test: test_rows.iter().map(|&i| y[i]).collect(),
        train_rows,
        test_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(n: usize) -> (FeatureMatrix, Vec<u8>) {
        let rows: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64]).collect();
        let x = FeatureMatrix::from_rows(vec!["v".to_string()], &rows).unwrap();
        let y = (0..n).map(|i| (i % 2) as u8).collect();
        (x, y)
    }

    #[test]
    fn test_split_sizes_and_disjoint() {
        let (x, y) = data(11);
        let split = train_test_split(&x, &y, &SplitConfig::default()).unwrap();

        assert_eq!(split.test_rows.len(), 3); // ceil(0.2 * 11)
        assert_eq!(split.train_rows.len(), 8);

        let mut all: Vec<usize> = split.train_rows.iter().chain(&split.test_rows).copied().collect();
        all.sort();
        assert_eq!(all, (0..11).collect::<Vec<_>>());

        for (k, &i) in split.test_rows.iter().enumerate() {
            assert_eq!(split.x_test.row(k), &[i as f64]);
            assert_eq!(split.y_test[k], y[i]);
        }
    }

    #[test]
    fn test_split_is_reproducible() {
        let (x, y) = data(50);
        let cfg = SplitConfig { test_fraction: 0.2, seed: 7 };
        let a = train_test_split(&x, &y, &cfg).unwrap();
        let b = train_test_split(&x, &y, &cfg).unwrap();
        assert_eq!(a, b);

        let c = train_test_split(&x, &y, &SplitConfig { test_fraction: 0.2, seed: 8 }).unwrap();
        assert_ne!(a.test_rows, c.test_rows);
    }

    #[test]
    fn test_split_rejects_bad_input() {
        let (x, y) = data(5);
        assert!(matches!(
            train_test_split(&x, &y[..4], &SplitConfig::default()),
            Err(EvalError::ShapeMismatch(_))
        ));
        assert!(matches!(
            train_test_split(&x, &y, &SplitConfig { test_fraction: 1.0, seed: 0 }),
            Err(EvalError::DegenerateInput(_))
        ));
        let (x1, y1) = data(1);
        assert!(train_test_split(&x1, &y1, &SplitConfig::default()).is_err());
    }
}
