//! Training-set rebalancing.
//!
//! Resamplers see only the training partition. Output rows start with the
//! kept original rows; synthetic or duplicated rows are appended after them.

mod random;
mod synthetic;

pub use random::{RandomOverSampler, RandomUnderSampler};
pub use synthetic::{Adasyn, Smote};

use serde::{Deserialize, Serialize};

use crate::dataset::{FeatureMatrix, class_counts};
use crate::error::{EvalError, Result};

pub trait Resampler {
    fn name(&self) -> String;

    /// Rebalanced copy of `(x, y)`
    fn fit_resample(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<(FeatureMatrix, Vec<u8>)>;
}

impl<R: Resampler + ?Sized> Resampler for Box<R> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn fit_resample(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<(FeatureMatrix, Vec<u8>)> {
        (**self).fit_resample(x, y)
    }
}

/// Class layout of a binary training set
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ClassSplit {
    pub minority: u8,
    pub minority_rows: Vec<usize>,
    pub majority_rows: Vec<usize>,
}

impl ClassSplit {
    /// Rows to add (or drop) to equalise the classes
    pub fn gap(&self) -> usize {
        self.majority_rows.len() - self.minority_rows.len()
    }
}

/// Check the training set and identify the minority class; on a tie the
/// positive class counts as the minority and the gap is zero.
pub(crate) fn split_classes(x: &FeatureMatrix, y: &[u8]) -> Result<ClassSplit> {
    if x.n_rows != y.len() {
        return Err(EvalError::ShapeMismatch(format!(
            "{} feature rows but {} labels",
            x.n_rows,
            y.len()
        )));
    }
    if y.iter().any(|&v| v > 1) {
        return Err(EvalError::DegenerateInput("labels must be 0 or 1".to_string()));
    }
    let [neg, pos] = class_counts(y);
    if neg == 0 || pos == 0 {
        return Err(EvalError::DegenerateInput(
            "resampling needs both classes in the training set".to_string(),
        ));
    }

    let minority = if pos <= neg { 1 } else { 0 };
    let (minority_rows, majority_rows) = (0..y.len()).partition(|&i| y[i] == minority);
    Ok(ClassSplit {
        minority,
        minority_rows,
        majority_rows,
    })
}

/// Resampler configuration.
///
/// ```toml
/// [[remedies]]
/// kind = "smote"
/// k_neighbors = 5
/// seed = 0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResamplerSpec {
    RandomUnder {
        #[serde(default)]
        seed: u64,
    },
    RandomOver {
        #[serde(default)]
        seed: u64,
    },
    Smote {
        #[serde(default = "default_neighbors")]
        k_neighbors: usize,
        #[serde(default)]
        seed: u64,
    },
    Adasyn {
        #[serde(default = "default_neighbors")]
        n_neighbors: usize,
        #[serde(default)]
        seed: u64,
    },
}

fn default_neighbors() -> usize {
    5
}

impl ResamplerSpec {
    pub fn build(&self) -> Box<dyn Resampler> {
        match *self {
            ResamplerSpec::RandomUnder { seed } => Box::new(RandomUnderSampler::new(seed)),
            ResamplerSpec::RandomOver { seed } => Box::new(RandomOverSampler::new(seed)),
            ResamplerSpec::Smote { k_neighbors, seed } => Box::new(Smote::new(k_neighbors, seed)),
            ResamplerSpec::Adasyn { n_neighbors, seed } => Box::new(Adasyn::new(n_neighbors, seed)),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_data {
    use crate::dataset::FeatureMatrix;

    /// `n_pos` positives around (5, 5) and `n_neg` negatives around (0, 0)
    pub fn imbalanced(n_neg: usize, n_pos: usize) -> (FeatureMatrix, Vec<u8>) {
        let mut rows = Vec::new();
        let mut y = Vec::new();
        for i in 0..n_neg {
            rows.push(vec![(i % 7) as f64 * 0.1, (i % 5) as f64 * 0.1]);
            y.push(0);
        }
        for i in 0..n_pos {
            rows.push(vec![5.0 + i as f64 * 0.1, 5.0 - i as f64 * 0.05]);
            y.push(1);
        }
        let x = FeatureMatrix::from_rows(vec!["a".into(), "b".into()], &rows).unwrap();
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_classes() {
        let (x, y) = test_data::imbalanced(6, 2);
        let split = split_classes(&x, &y).unwrap();
        assert_eq!(split.minority, 1);
        assert_eq!(split.minority_rows, vec![6, 7]);
        assert_eq!(split.gap(), 4);

        assert!(matches!(
            split_classes(&x, &[0; 8]),
            Err(EvalError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_spec_from_toml() {
        let spec: ResamplerSpec = toml::from_str("kind = \"adasyn\"\nseed = 3\n").unwrap();
        assert_eq!(
            spec,
            ResamplerSpec::Adasyn {
                n_neighbors: 5,
                seed: 3
            }
        );
        assert_eq!(spec.build().name(), "ADASYN");
    }
}
