use std::fmt;

use anyhow::{Result, anyhow};
use serde::Serialize;

use open_direction::dataset::{Dataset, FeatureMatrix, SplitConfig, train_test_split};

/// Variance inflation factor of one feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVif {
    pub feature: String,
    pub vif: f64,
}

impl fmt::Display for FeatureVif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<24} {:>10.6}", self.feature, self.vif)
    }
}

/// VIF of every column, each regressed on the others plus an intercept
pub fn feature_vifs(x: &FeatureMatrix) -> Result<Vec<FeatureVif>> {
    let vifs = stats::variance_inflation_factors(&x.data, x.n_rows, x.n_cols())
        .map_err(|e| anyhow!("VIF computation failed: {}", e))?;

    Ok(x.columns
        .iter()
        .zip(vifs)
        .map(|(feature, vif)| FeatureVif {
            feature: feature.clone(),
            vif,
        })
        .collect())
}

/// VIFs over the training partition of `split`
pub fn training_vifs(dataset: &Dataset, split: &SplitConfig) -> Result<Vec<FeatureVif>> {
    let parts = train_test_split(&dataset.x, &dataset.y, split)?;
    feature_vifs(&parts.x_train)
}
