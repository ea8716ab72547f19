use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::{Classifier, check_features, check_training_data, proba_pair};
use crate::dataset::FeatureMatrix;
use crate::error::{EvalError, Result};

/// Minimum node size eligible for splitting: an absolute count or a
/// fraction of the training rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MinSamplesSplit {
    Count(usize),
    Fraction(f64),
}

impl MinSamplesSplit {
    fn resolve(&self, n_rows: usize) -> Result<usize> {
        match *self {
            MinSamplesSplit::Count(c) if c >= 2 => Ok(c),
            MinSamplesSplit::Fraction(f) if f > 0.0 && f <= 1.0 => {
                Ok(((f * n_rows as f64).ceil() as usize).max(2))
            }
            other => Err(EvalError::FitError(format!(
                "invalid min_samples_split {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Splitter {
    /// Exhaustive search over midpoints between sorted values
    #[default]
    Best,
    /// One uniform random threshold per candidate feature
    Random,
}

/// Number of features considered at each split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    #[default]
    All,
    Sqrt,
    Log2,
    Count(usize),
}

impl MaxFeatures {
    fn resolve(&self, n_features: usize) -> usize {
        let k = match *self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2() as usize,
            MaxFeatures::Count(c) => c,
        };
        k.clamp(1, n_features.max(1))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        proba: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// CART classification tree with Gini impurity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionTree {
    pub max_depth: Option<usize>,
    pub min_samples_split: MinSamplesSplit,
    pub min_samples_leaf: usize,
    pub splitter: Splitter,
    pub max_features: MaxFeatures,
    pub seed: u64,
    #[serde(skip)]
    pub(crate) nodes: Vec<Node>,
    #[serde(skip)]
    pub(crate) n_features: usize,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self {
            max_depth: Some(10),
            min_samples_split: MinSamplesSplit::Count(2),
            min_samples_leaf: 1,
            splitter: Splitter::Best,
            max_features: MaxFeatures::All,
            seed: 0,
            nodes: Vec::new(),
            n_features: 0,
        }
    }
}

/// Best split found for one node
struct Candidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

fn gini(positives: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    let p = positives / total;
    2.0 * p * (1.0 - p)
}

struct Builder<'a> {
    x: &'a FeatureMatrix,
    y: &'a [u8],
    max_depth: usize,
    min_split: usize,
    min_leaf: usize,
    splitter: Splitter,
    n_candidates: usize,
    rng: ChaCha8Rng,
    nodes: Vec<Node>,
}

impl Builder<'_> {
    fn build(&mut self, rows: &[usize], depth: usize) -> usize {
        let total = rows.len();
        let positives = rows.iter().filter(|&&i| self.y[i] == 1).count();
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            proba: positives as f64 / total.max(1) as f64,
        });

        let pure = positives == 0 || positives == total;
        if pure || depth >= self.max_depth || total < self.min_split || total < 2 * self.min_leaf {
            return id;
        }

        let Some(best) = self.find_split(rows, positives) else {
            return id;
        };

        let x = self.x;
        let (left, right): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .copied()
            .partition(|&i| x.row(i)[best.feature] <= best.threshold);

        let left_id = self.build(&left, depth + 1);
        let right_id = self.build(&right, depth + 1);
        self.nodes[id] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: left_id,
            right: right_id,
        };
        id
    }

    fn find_split(&mut self, rows: &[usize], positives: usize) -> Option<Candidate> {
        let mut features: Vec<usize> = (0..self.x.n_cols()).collect();
        features.shuffle(&mut self.rng);
        features.truncate(self.n_candidates);

        let mut best: Option<Candidate> = None;
        for &feature in &features {
            let candidate = match self.splitter {
                Splitter::Best => self.best_threshold(rows, feature, positives),
                Splitter::Random => self.random_threshold(rows, feature),
            };
            if let Some(c) = candidate {
                if best.as_ref().is_none_or(|b| c.impurity < b.impurity) {
                    best = Some(c);
                }
            }
        }
        best
    }

    fn best_threshold(&self, rows: &[usize], feature: usize, positives: usize) -> Option<Candidate> {
        let mut values: Vec<(f64, u8)> = rows
            .iter()
            .map(|&i| (self.x.row(i)[feature], self.y[i]))
            .collect();
        values.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = values.len() as f64;
        let total_pos = positives as f64;
        let mut left_pos = 0.0;
        let mut best: Option<Candidate> = None;

        for split in 1..values.len() {
            left_pos += f64::from(values[split - 1].1);
            if values[split].0 <= values[split - 1].0 {
                continue;
            }
            if split < self.min_leaf || values.len() - split < self.min_leaf {
                continue;
            }
            let nl = split as f64;
            let nr = n - nl;
            let impurity =
                (nl * gini(left_pos, nl) + nr * gini(total_pos - left_pos, nr)) / n;
            if best.as_ref().is_none_or(|b| impurity < b.impurity) {
                best = Some(Candidate {
                    feature,
                    threshold: (values[split - 1].0 + values[split].0) / 2.0,
                    impurity,
                });
            }
        }
        best
    }

    fn random_threshold(&mut self, rows: &[usize], feature: usize) -> Option<Candidate> {
        let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
            let v = self.x.row(i)[feature];
            (lo.min(v), hi.max(v))
        });
        if !(hi > lo) {
            return None;
        }
        let threshold = self.rng.gen_range(lo..hi);

        let (mut nl, mut pl, mut nr, mut pr) = (0.0, 0.0, 0.0, 0.0);
        for &i in rows {
            let positive = f64::from(self.y[i]);
            if self.x.row(i)[feature] <= threshold {
                nl += 1.0;
                pl += positive;
            } else {
                nr += 1.0;
                pr += positive;
            }
        }
        let min_leaf = self.min_leaf as f64;
        if nl < min_leaf || nr < min_leaf || nl == 0.0 || nr == 0.0 {
            return None;
        }

        Some(Candidate {
            feature,
            threshold,
            impurity: (nl * gini(pl, nl) + nr * gini(pr, nr)) / (nl + nr),
        })
    }
}

impl DecisionTree {
    /// Grow the tree on the listed training rows (duplicates allowed).
    ///
    /// Unlike [`Classifier::fit`], a single-class row set is accepted and
    /// yields a one-leaf tree; bootstrap samples rely on this.
    pub(crate) fn fit_rows(&mut self, x: &FeatureMatrix, y: &[u8], rows: Vec<usize>) -> Result<()> {
        if rows.is_empty() {
            return Err(EvalError::FitError("cannot grow a tree on zero rows".to_string()));
        }
        if self.min_samples_leaf == 0 {
            return Err(EvalError::FitError("min_samples_leaf must be at least 1".to_string()));
        }

        let mut builder = Builder {
            x,
            y,
            max_depth: self.max_depth.unwrap_or(usize::MAX),
            min_split: self.min_samples_split.resolve(rows.len())?,
            min_leaf: self.min_samples_leaf,
            splitter: self.splitter,
            n_candidates: self.max_features.resolve(x.n_cols()),
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            nodes: Vec::new(),
        };
        builder.build(&rows, 0);

        self.nodes = builder.nodes;
        self.n_features = x.n_cols();
        Ok(())
    }

    pub(crate) fn positive_proba(&self, row: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes[id] {
                Node::Leaf { proba } => return proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => id = if row[feature] <= threshold { left } else { right },
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }

    pub(crate) fn n_features(&self) -> usize {
        self.n_features
    }
}

impl Classifier for DecisionTree {
    fn name(&self) -> String {
        "Decision Tree".to_string()
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<()> {
        check_training_data(x, y)?;
        self.fit_rows(x, y, (0..x.n_rows).collect())
    }

    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<[f64; 2]>> {
        check_features(self.n_features, x)?;
        Ok(x.rows().map(|row| proba_pair(self.positive_proba(row))).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_data::{accuracy, blobs};

    #[test]
    fn test_tree_learns_threshold() {
        let x = FeatureMatrix::from_rows(
            vec!["v".into()],
            &[vec![1.0], vec![2.0], vec![3.0], vec![4.0]],
        )
        .unwrap();
        let mut tree = DecisionTree::default();
        tree.fit(&x, &[0, 0, 1, 1]).unwrap();

        assert_eq!(tree.depth(), 1);
        let proba = tree.predict_proba(&x).unwrap();
        assert_eq!(proba.iter().map(|p| p[1]).collect::<Vec<_>>(), vec![0.0, 0.0, 1.0, 1.0]);

        let mid = FeatureMatrix::from_rows(vec!["v".into()], &[vec![2.4], vec![2.6]]).unwrap();
        let proba = tree.predict_proba(&mid).unwrap();
        assert_eq!(proba[0][1], 0.0);
        assert_eq!(proba[1][1], 1.0);
    }

    #[test]
    fn test_tree_respects_max_depth_and_min_split() {
        let (x, y) = blobs(100, 5);
        let mut tree = DecisionTree {
            max_depth: Some(2),
            ..Default::default()
        };
        tree.fit(&x, &y).unwrap();
        assert!(tree.depth() <= 2);

        let mut stump = DecisionTree {
            min_samples_split: MinSamplesSplit::Fraction(1.0),
            max_depth: None,
            ..Default::default()
        };
        stump.fit(&x, &y).unwrap();
        // only the root holds every row
        assert_eq!(stump.depth(), 1);
    }

    #[test]
    fn test_random_splitter_is_seeded() {
        let (x, y) = blobs(60, 6);
        let make = |seed| DecisionTree {
            splitter: Splitter::Random,
            seed,
            ..Default::default()
        };
        let mut a = make(1337);
        let mut b = make(1337);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
        assert!(accuracy(&a.predict_proba(&x).unwrap(), &y) > 0.8);
    }

    #[test]
    fn test_invalid_min_samples_split() {
        let (x, y) = blobs(10, 7);
        let mut tree = DecisionTree {
            min_samples_split: MinSamplesSplit::Count(1),
            ..Default::default()
        };
        assert!(matches!(tree.fit(&x, &y), Err(EvalError::FitError(_))));
    }
}
