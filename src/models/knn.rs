use serde::{Deserialize, Serialize};

use matlib::k_nearest;

use super::{Classifier, check_features, check_training_data};
use crate::dataset::FeatureMatrix;
use crate::error::{EvalError, Result};

/// K-nearest-neighbour vote with uniform weights and Euclidean distance.
///
/// The positive probability is the share of positive labels among the
/// `n_neighbors` closest training rows. Distance ties go to the earlier
/// training row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KNearestNeighbors {
    pub n_neighbors: usize,
    #[serde(skip)]
    train_x: Vec<f64>,
    #[serde(skip)]
    train_y: Vec<u8>,
    #[serde(skip)]
    n_cols: usize,
}

impl Default for KNearestNeighbors {
    fn default() -> Self {
        Self::new(5)
    }
}

impl KNearestNeighbors {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            train_x: Vec::new(),
            train_y: Vec::new(),
            n_cols: 0,
        }
    }
}

impl Classifier for KNearestNeighbors {
    fn name(&self) -> String {
        "KNN".to_string()
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<()> {
        check_training_data(x, y)?;
        if self.n_neighbors == 0 || self.n_neighbors > x.n_rows {
            return Err(EvalError::FitError(format!(
                "n_neighbors = {} but only {} training rows",
                self.n_neighbors, x.n_rows
            )));
        }

        self.train_x = x.data.clone();
        self.train_y = y.to_vec();
        self.n_cols = x.n_cols();
        Ok(())
    }

    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<[f64; 2]>> {
        check_features(self.n_cols, x)?;

        let k = self.n_neighbors as f64;
        Ok(x
            .rows()
            .map(|row| {
                let neighbours = k_nearest(&self.train_x, self.n_cols, row, self.n_neighbors, None);
                let positives = neighbours.iter().filter(|&&i| self.train_y[i] == 1).count();
                let p = positives as f64 / k;
                [1.0 - p, p]
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knn_vote_fraction() {
        let x = FeatureMatrix::from_rows(
            vec!["v".into()],
            &[vec![0.0], vec![1.0], vec![2.0], vec![10.0]],
        )
        .unwrap();
        let mut model = KNearestNeighbors::new(3);
        model.fit(&x, &[1, 1, 0, 0]).unwrap();

        let query = FeatureMatrix::from_rows(vec!["v".into()], &[vec![0.5], vec![9.0]]).unwrap();
        let proba = model.predict_proba(&query).unwrap();
        assert!((proba[0][1] - 2.0 / 3.0).abs() < 1e-12);
        // neighbours of 9.0 are 10, 2, 1
        assert!((proba[1][1] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_knn_too_many_neighbours() {
        let x = FeatureMatrix::from_rows(vec!["v".into()], &[vec![0.0], vec![1.0]]).unwrap();
        let mut model = KNearestNeighbors::new(30);
        assert!(matches!(model.fit(&x, &[0, 1]), Err(EvalError::FitError(_))));
    }
}
