//! Binary classifiers behind one capability trait.
//!
//! Every model is fitted on a [`FeatureMatrix`] with 0/1 labels and reports
//! two-column probabilities, column 1 being the positive class. Models are
//! deterministic given their seed.

mod forest;
mod knn;
mod logistic;
mod mlp;
mod naive_bayes;
mod scaling;
mod svc;
mod tree;

pub use forest::RandomForest;
pub use knn::KNearestNeighbors;
pub use logistic::LogisticRegression;
pub use mlp::MultilayerPerceptron;
pub use naive_bayes::GaussianNaiveBayes;
pub use scaling::{FittedScaler, Scaled, Scaler};
pub use svc::LinearSvc;
pub use tree::{DecisionTree, MaxFeatures, MinSamplesSplit, Splitter};

use serde::{Deserialize, Serialize};

use crate::dataset::{FeatureMatrix, class_counts};
use crate::error::{EvalError, Result};

/// A probabilistic binary classifier.
pub trait Classifier {
    /// Human-readable model description used in reports
    fn name(&self) -> String;

    fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<()>;

    /// `[P(y = 0), P(y = 1)]` for every row of `x`
    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<[f64; 2]>>;

    /// Positive-class scores, column 1 of [`Classifier::predict_proba`]
    fn positive_scores(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        Ok(self.predict_proba(x)?.into_iter().map(|p| p[1]).collect())
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<()> {
        (**self).fit(x, y)
    }

    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<[f64; 2]>> {
        (**self).predict_proba(x)
    }
}

/// Per-class weighting of the training loss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    #[default]
    None,
    /// Weight each class by `n / (2 * n_class)`
    Balanced,
}

impl ClassWeight {
    pub fn sample_weights(&self, y: &[u8]) -> Vec<f64> {
        match self {
            ClassWeight::None => vec![1.0; y.len()],
            ClassWeight::Balanced => {
                let counts = class_counts(y);
                let n = y.len() as f64;
                let w = [
                    n / (2.0 * counts[0].max(1) as f64),
                    n / (2.0 * counts[1].max(1) as f64),
                ];
                y.iter().map(|&c| w[c as usize]).collect()
            }
        }
    }
}

/// Validate a training set: matching row counts, labels in {0, 1}, and both
/// classes present. Returns the class counts.
pub(crate) fn check_training_data(x: &FeatureMatrix, y: &[u8]) -> Result<[usize; 2]> {
    if x.n_rows != y.len() {
        return Err(EvalError::ShapeMismatch(format!(
            "{} feature rows but {} labels",
            x.n_rows,
            y.len()
        )));
    }
    if let Some(bad) = y.iter().find(|&&v| v > 1) {
        return Err(EvalError::FitError(format!("label {} is not binary", bad)));
    }
    let counts = class_counts(y);
    if counts[0] == 0 || counts[1] == 0 {
        return Err(EvalError::FitError(format!(
            "need both classes to fit, got {} negatives and {} positives",
            counts[0], counts[1]
        )));
    }
    Ok(counts)
}

pub(crate) fn check_features(expected: usize, x: &FeatureMatrix) -> Result<()> {
    if expected == 0 {
        return Err(EvalError::FitError("model has not been fitted".to_string()));
    }
    if x.n_cols() != expected {
        return Err(EvalError::ShapeMismatch(format!(
            "model was fitted on {} features, got {}",
            expected,
            x.n_cols()
        )));
    }
    Ok(())
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

pub(crate) fn proba_pair(p: f64) -> [f64; 2] {
    [1.0 - p, p]
}

/// Model family and hyper-parameters, as read from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelKind {
    LogisticRegression(LogisticRegression),
    NaiveBayes(GaussianNaiveBayes),
    Knn(KNearestNeighbors),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
    Svc(LinearSvc),
    Mlp(MultilayerPerceptron),
}

impl ModelKind {
    fn into_classifier(self) -> Box<dyn Classifier> {
        match self {
            ModelKind::LogisticRegression(m) => Box::new(m),
            ModelKind::NaiveBayes(m) => Box::new(m),
            ModelKind::Knn(m) => Box::new(m),
            ModelKind::DecisionTree(m) => Box::new(m),
            ModelKind::RandomForest(m) => Box::new(m),
            ModelKind::Svc(m) => Box::new(m),
            ModelKind::Mlp(m) => Box::new(m),
        }
    }
}

/// A configured model: family, optional display name and optional scaler.
///
/// ```toml
/// [[models]]
/// kind = "knn"
/// n_neighbors = 30
/// scaler = "standard"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scaler: Option<Scaler>,
    #[serde(flatten)]
    pub model: ModelKind,
}

impl ModelSpec {
    pub fn new(model: ModelKind) -> Self {
        Self {
            name: None,
            scaler: None,
            model,
        }
    }

    pub fn with_scaler(mut self, scaler: Scaler) -> Self {
        self.scaler = Some(scaler);
        self
    }

    /// Fresh, unfitted classifier for this specification
    pub fn build(&self) -> Box<dyn Classifier> {
        let inner = self.model.clone().into_classifier();
        let model: Box<dyn Classifier> = match self.scaler {
            Some(scaler) => Box::new(Scaled::new(scaler, inner)),
            None => inner,
        };
        match &self.name {
            Some(name) => Box::new(Named {
                name: name.clone(),
                inner: model,
            }),
            None => model,
        }
    }
}

/// Overrides the reported name of a classifier
struct Named {
    name: String,
    inner: Box<dyn Classifier>,
}

impl Classifier for Named {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<()> {
        self.inner.fit(x, y)
    }

    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<[f64; 2]>> {
        self.inner.predict_proba(x)
    }
}

/// The seven model configurations compared by default.
pub fn default_models() -> Vec<ModelSpec> {
    vec![
        ModelSpec::new(ModelKind::LogisticRegression(LogisticRegression {
            max_iter: 1000,
            ..Default::default()
        })),
        ModelSpec::new(ModelKind::NaiveBayes(GaussianNaiveBayes::default())),
        ModelSpec::new(ModelKind::Knn(KNearestNeighbors::new(30))).with_scaler(Scaler::Standard),
        ModelSpec::new(ModelKind::DecisionTree(DecisionTree {
            max_depth: Some(10),
            min_samples_split: MinSamplesSplit::Fraction(0.4),
            splitter: Splitter::Random,
            seed: 1337,
            ..Default::default()
        })),
        ModelSpec::new(ModelKind::RandomForest(RandomForest {
            max_depth: Some(10),
            min_samples_split: MinSamplesSplit::Fraction(0.2),
            seed: 1337,
            ..Default::default()
        })),
        ModelSpec::new(ModelKind::Svc(LinearSvc {
            c: 1.0,
            seed: 1337,
            ..Default::default()
        })),
        ModelSpec::new(ModelKind::Mlp(MultilayerPerceptron {
            alpha: 0.001,
            max_iter: 1000,
            seed: 1337,
            ..Default::default()
        }))
        .with_scaler(Scaler::MinMax),
    ]
}

#[cfg(test)]
pub(crate) mod test_data {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use crate::dataset::FeatureMatrix;

    /// Two noisy Gaussian blobs; positives centred at `(+1, +1)`
    pub fn blobs(n_per_class: usize, seed: u64) -> (FeatureMatrix, Vec<u8>) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut rows = Vec::new();
        let mut y = Vec::new();
        for i in 0..2 * n_per_class {
            let label = (i % 2) as u8;
            let centre = if label == 1 { 1.0 } else { -1.0 };
            rows.push(vec![
                centre + rng.gen_range(-1.0..1.0),
                centre + rng.gen_range(-1.0..1.0),
            ]);
            y.push(label);
        }
        let x = FeatureMatrix::from_rows(vec!["a".to_string(), "b".to_string()], &rows).unwrap();
        (x, y)
    }

    /// Fraction of rows whose positive probability falls on the right side of 0.5
    pub fn accuracy(proba: &[[f64; 2]], y: &[u8]) -> f64 {
        let hits = proba
            .iter()
            .zip(y)
            .filter(|(p, l)| (p[1] > 0.5) == (**l == 1))
            .count();
        hits as f64 / y.len() as f64
    }
}
