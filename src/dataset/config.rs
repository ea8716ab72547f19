use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{Dataset, DatasetSpec, FeatureConfig, load_dataset};
use crate::error::{EvalError, Result};

/// Where the master table lives and which dataset to build from it.
///
/// ```toml
/// [data]
/// master_file = "data/master.csv"
/// target = "NSEI"
/// features = ["IXIC_DAILY_RETURNS", "DJI_RSI"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_master_file")]
    pub master_file: PathBuf,
    /// Indices whose derived columns are computed
    #[serde(default = "default_indices")]
    pub indices: Vec<String>,
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default = "default_features")]
    pub features: Vec<String>,
    #[serde(default)]
    pub indicators: FeatureConfig,
}

pub fn default_master_file() -> PathBuf {
    PathBuf::from("data/master.csv")
}

pub fn default_indices() -> Vec<String> {
    ["NSEI", "DJI", "IXIC", "HSI", "N225", "GDAXI", "VIX"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_target() -> String {
    "NSEI".to_string()
}

fn default_features() -> Vec<String> {
    [
        "IXIC_DAILY_RETURNS",
        "HSI_DAILY_RETURNS",
        "N225_DAILY_RETURNS",
        "VIX_DAILY_RETURNS",
        "DJI_RSI",
        "DJI_TSI",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            master_file: default_master_file(),
            indices: default_indices(),
            target: default_target(),
            features: default_features(),
            indicators: FeatureConfig::default(),
        }
    }
}

impl DataConfig {
    pub fn spec(&self) -> DatasetSpec {
        DatasetSpec {
            target: self.target.clone(),
            features: self.features.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.indices.is_empty() {
            return Err(EvalError::Config("at least one index is required".to_string()));
        }
        if !self.indices.contains(&self.target) {
            return Err(EvalError::Config(format!(
                "target {} is not among the indices {:?}",
                self.target, self.indices
            )));
        }
        if self.features.is_empty() {
            return Err(EvalError::Config("feature list is empty".to_string()));
        }
        let cfg = &self.indicators;
        if cfg.rsi_period == 0 || cfg.tsi_long == 0 || cfg.tsi_short == 0 {
            return Err(EvalError::Config("indicator periods must be positive".to_string()));
        }
        Ok(())
    }

    /// Read, derive and assemble the configured dataset
    pub fn load(&self) -> Result<Dataset> {
        load_dataset(&self.master_file, &self.indices, &self.indicators, &self.spec())
    }
}
