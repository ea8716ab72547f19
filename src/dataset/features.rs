use serde::{Deserialize, Serialize};
use tracing::debug;

use indicators::{daily_returns, hl_ratio, oc_ratio, rsi, tsi};

use super::MasterTable;
use crate::error::Result;

/// Indicator periods used when deriving feature columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_tsi_long")]
    pub tsi_long: usize,
    #[serde(default = "default_tsi_short")]
    pub tsi_short: usize,
}

fn default_rsi_period() -> usize {
    14
}

fn default_tsi_long() -> usize {
    25
}

fn default_tsi_short() -> usize {
    13
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            tsi_long: default_tsi_long(),
            tsi_short: default_tsi_short(),
        }
    }
}

/// Names of the columns [`derive_features`] adds for one index
pub fn derived_columns(index: &str) -> [String; 5] {
    [
        format!("{index}_DAILY_RETURNS"),
        format!("{index}_HL_RATIO"),
        format!("{index}_OC_RATIO"),
        format!("{index}_RSI"),
        format!("{index}_TSI"),
    ]
}

/// Add daily returns, price ratios, RSI and TSI columns for every index.
///
/// Each index needs its `_OPEN`, `_HIGH`, `_LOW` and `_CLOSE` columns in the
/// table. Warm-up rows of the indicators are NaN.
pub fn derive_features(table: &mut MasterTable, indices: &[String], cfg: &FeatureConfig) -> Result<()> {
    for index in indices {
        let open = table.column(&format!("{index}_OPEN"))?.to_vec();
        let high = table.column(&format!("{index}_HIGH"))?.to_vec();
        let low = table.column(&format!("{index}_LOW"))?.to_vec();
        let close = table.column(&format!("{index}_CLOSE"))?.to_vec();

        let [returns_name, hl_name, oc_name, rsi_name, tsi_name] = derived_columns(index);
        table.insert_column(&returns_name, daily_returns(&close))?;
        table.insert_column(&hl_name, hl_ratio(&high, &low))?;
        table.insert_column(&oc_name, oc_ratio(&open, &close))?;
        table.insert_column(&rsi_name, rsi(&close, cfg.rsi_period))?;
        table.insert_column(&tsi_name, tsi(&close, cfg.tsi_long, cfg.tsi_short))?;

        debug!(index = index.as_str(), "derived feature columns");
    }
    Ok(())
}
