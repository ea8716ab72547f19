use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use matlib::k_nearest;

use super::{ClassSplit, Resampler, split_classes};
use crate::dataset::FeatureMatrix;
use crate::error::{EvalError, Result};

/// Synthetic Minority Over-sampling Technique.
///
/// Each new row interpolates between a random minority row and one of its
/// `k_neighbors` nearest minority neighbours, at a uniform gap in `[0, 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Smote {
    pub k_neighbors: usize,
    pub seed: u64,
}

impl Smote {
    pub fn new(k_neighbors: usize, seed: u64) -> Self {
        Self { k_neighbors, seed }
    }
}

/// Adaptive synthetic sampling.
///
/// Like SMOTE, but minority rows surrounded by more majority neighbours
/// (among their `n_neighbors` nearest in the whole training set) receive
/// proportionally more synthetic rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Adasyn {
    pub n_neighbors: usize,
    pub seed: u64,
}

impl Adasyn {
    pub fn new(n_neighbors: usize, seed: u64) -> Self {
        Self { n_neighbors, seed }
    }
}

/// Minority rows and, for each, its `k` nearest minority neighbours
struct MinorityNeighbors {
    rows: FeatureMatrix,
    neighbors: Vec<Vec<usize>>,
}

impl MinorityNeighbors {
    fn new(x: &FeatureMatrix, split: &ClassSplit, k: usize) -> Result<Self> {
        let n_min = split.minority_rows.len();
        if k == 0 || n_min < k + 1 {
            return Err(EvalError::DegenerateInput(format!(
                "{n_min} minority rows cannot supply {k} neighbours each"
            )));
        }

        let rows = x.select_rows(&split.minority_rows);
        let neighbors = (0..n_min)
            .map(|i| k_nearest(&rows.data, rows.n_cols(), rows.row(i), k, Some(i)))
            .collect();
        Ok(Self { rows, neighbors })
    }

    /// Point on the segment from minority row `i` towards its `j`-th neighbour
    fn interpolate(&self, i: usize, j: usize, gap: f64) -> Vec<f64> {
        let base = self.rows.row(i);
        let other = self.rows.row(self.neighbors[i][j]);
        base.iter().zip(other).map(|(b, o)| b + gap * (o - b)).collect()
    }
}

fn append_synthetic(
    x: &FeatureMatrix,
    y: &[u8],
    label: u8,
    synthetic: Vec<Vec<f64>>,
) -> Result<(FeatureMatrix, Vec<u8>)> {
    let mut out = x.clone();
    let mut y_out = y.to_vec();
    for row in &synthetic {
        out.push_row(row)?;
        y_out.push(label);
    }
    Ok((out, y_out))
}

impl Resampler for Smote {
    fn name(&self) -> String {
        "SMOTE".to_string()
    }

    fn fit_resample(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<(FeatureMatrix, Vec<u8>)> {
        let split = split_classes(x, y)?;
        if split.gap() == 0 {
            return Ok((x.clone(), y.to_vec()));
        }

        let k = self.k_neighbors;
        let nn = MinorityNeighbors::new(x, &split, k)?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let n_min = split.minority_rows.len();

        let synthetic = (0..split.gap())
            .map(|_| {
                let pick = rng.gen_range(0..n_min * k);
                let gap = rng.gen_range(0.0..1.0);
                nn.interpolate(pick / k, pick % k, gap)
            })
            .collect();

        debug!(added = split.gap(), minority = split.minority, "smote");
        append_synthetic(x, y, split.minority, synthetic)
    }
}

impl Resampler for Adasyn {
    fn name(&self) -> String {
        "ADASYN".to_string()
    }

    fn fit_resample(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<(FeatureMatrix, Vec<u8>)> {
        let split = split_classes(x, y)?;
        if split.gap() == 0 {
            return Ok((x.clone(), y.to_vec()));
        }

        let k = self.n_neighbors;
        let nn = MinorityNeighbors::new(x, &split, k)?;

        // share of majority rows among each minority row's neighbours in the full set
        let hardness: Vec<f64> = split
            .minority_rows
            .iter()
            .map(|&g| {
                let around = k_nearest(&x.data, x.n_cols(), x.row(g), k, Some(g));
                around.iter().filter(|&&j| y[j] != split.minority).count() as f64 / k as f64
            })
            .collect();

        let total: f64 = hardness.iter().sum();
        if total == 0.0 {
            return Err(EvalError::DegenerateInput(
                "no minority row has a majority-class neighbour".to_string(),
            ));
        }

        let gap_rows = split.gap() as f64;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut synthetic = Vec::new();
        for (i, h) in hardness.iter().enumerate() {
            let count = (h / total * gap_rows).round_ties_even() as usize;
            for _ in 0..count {
                let j = rng.gen_range(0..k);
                let gap = rng.gen_range(0.0..1.0);
                synthetic.push(nn.interpolate(i, j, gap));
            }
        }

        debug!(added = synthetic.len(), minority = split.minority, "adasyn");
        append_synthetic(x, y, split.minority, synthetic)
    }
}
