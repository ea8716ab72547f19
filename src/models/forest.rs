use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    Classifier, DecisionTree, MaxFeatures, MinSamplesSplit, Splitter, check_features,
    check_training_data, proba_pair,
};
use crate::dataset::FeatureMatrix;
use crate::error::{EvalError, Result};

/// Bagged ensemble of Gini trees; probabilities are averaged over trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomForest {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: MinSamplesSplit,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub seed: u64,
    #[serde(skip)]
    pub(crate) trees: Vec<DecisionTree>,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: MinSamplesSplit::Count(2),
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 0,
            trees: Vec::new(),
        }
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> String {
        "Random Forest".to_string()
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<()> {
        check_training_data(x, y)?;
        if self.n_trees == 0 {
            return Err(EvalError::FitError("n_trees must be at least 1".to_string()));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let n = x.n_rows;
        let mut trees = Vec::with_capacity(self.n_trees);

        for _ in 0..self.n_trees {
            let mut tree = DecisionTree {
                max_depth: self.max_depth,
                min_samples_split: self.min_samples_split,
                min_samples_leaf: self.min_samples_leaf,
                splitter: Splitter::Best,
                max_features: self.max_features,
                seed: rng.next_u64(),
                ..Default::default()
            };

            let rows: Vec<usize> = if self.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };

            tree.fit_rows(x, y, rows)?;
            trees.push(tree);
        }

        debug!(
            trees = trees.len(),
            mean_nodes = trees.iter().map(|t| t.n_nodes()).sum::<usize>() / trees.len(),
            "random forest fitted"
        );
        self.trees = trees;
        Ok(())
    }

    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<[f64; 2]>> {
        let n_features = self.trees.first().map_or(0, |t| t.n_features());
        check_features(n_features, x)?;

        let k = self.trees.len() as f64;
        Ok(x
            .rows()
            .map(|row| {
                let p = self.trees.iter().map(|t| t.positive_proba(row)).sum::<f64>() / k;
                proba_pair(p)
            })
            .collect())
    }
}
