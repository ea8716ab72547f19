use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::{Resampler, split_classes};
use crate::dataset::FeatureMatrix;
use crate::error::Result;

/// Drop majority rows, drawn without replacement, down to the minority count.
///
/// Surviving rows keep their original order.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomUnderSampler {
    pub seed: u64,
}

impl RandomUnderSampler {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Resampler for RandomUnderSampler {
    fn name(&self) -> String {
        "RandomUnderSampler".to_string()
    }

    fn fit_resample(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<(FeatureMatrix, Vec<u8>)> {
        let split = split_classes(x, y)?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let keep = split.minority_rows.len();
        let chosen = rand::seq::index::sample(&mut rng, split.majority_rows.len(), keep);

        let mut rows: Vec<usize> = chosen.iter().map(|k| split.majority_rows[k]).collect();
        rows.extend(&split.minority_rows);
        rows.sort_unstable();

        debug!(before = y.len(), after = rows.len(), "random under-sampling");
        let y_new = rows.iter().map(|&i| y[i]).collect();
        Ok((x.select_rows(&rows), y_new))
    }
}

/// Duplicate minority rows, drawn with replacement, up to the majority count.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomOverSampler {
    pub seed: u64,
}

impl RandomOverSampler {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Resampler for RandomOverSampler {
    fn name(&self) -> String {
        "RandomOverSampler".to_string()
    }

    fn fit_resample(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<(FeatureMatrix, Vec<u8>)> {
        let split = split_classes(x, y)?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut rows: Vec<usize> = (0..y.len()).collect();
        let n_min = split.minority_rows.len();
        for _ in 0..split.gap() {
            rows.push(split.minority_rows[rng.gen_range(0..n_min)]);
        }

        debug!(before = y.len(), after = rows.len(), "random over-sampling");
        let y_new = rows.iter().map(|&i| y[i]).collect();
        Ok((x.select_rows(&rows), y_new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::class_counts;
    use crate::resampling::test_data::imbalanced;

    #[test]
    fn test_under_sampler_balances_and_keeps_order() {
        let (x, y) = imbalanced(10, 3);
        let (xr, yr) = RandomUnderSampler::new(0).fit_resample(&x, &y).unwrap();

        assert_eq!(class_counts(&yr), [3, 3]);
        assert_eq!(xr.n_rows, 6);
        // minority rows come last in the source and stay last
        assert_eq!(&yr[3..], &[1, 1, 1]);
        assert_eq!(xr.row(5), x.row(12));
    }

    #[test]
    fn test_over_sampler_appends_duplicates() {
        let (x, y) = imbalanced(10, 3);
        let (xr, yr) = RandomOverSampler::new(0).fit_resample(&x, &y).unwrap();

        assert_eq!(class_counts(&yr), [10, 10]);
        assert_eq!(&xr.data[..x.data.len()], &x.data[..]);
        for i in 13..20 {
            let r = xr.row(i);
            assert!((10..13).any(|j| x.row(j) == r));
        }
    }

    #[test]
    fn test_random_samplers_are_seeded() {
        let (x, y) = imbalanced(20, 4);
        let a = RandomUnderSampler::new(9).fit_resample(&x, &y).unwrap();
        let b = RandomUnderSampler::new(9).fit_resample(&x, &y).unwrap();
        assert_eq!(a, b);
    }
}
