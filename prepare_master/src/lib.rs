pub mod config;

pub use config::Config;

use anyhow::{Context, Result};
use tracing::info;

use open_direction::core::io::{read_index_file, write_master_file};
use open_direction::dataset::MasterTable;

/// Read every configured index file and inner-join them on date
pub fn build_master(config: &Config) -> Result<MasterTable> {
    let mut series = Vec::with_capacity(config.indices.len());
    for index in &config.indices {
        let path = config.index_file(index);
        let history = read_index_file(&path, index)
            .with_context(|| format!("Failed to read index file: {}", path.display()))?;
        info!(index = %index, rows = history.len(), "index history loaded");
        series.push(history);
    }

    let table = MasterTable::merge(&series)?;
    if table.is_empty() {
        anyhow::bail!("No trading dates common to all of {:?}", config.indices);
    }
    Ok(table)
}

/// Build the master table and write it to `config.master_file`
pub fn run(config: &Config) -> Result<MasterTable> {
    let table = build_master(config)?;
    write_master_file(&config.master_file, &table)
        .with_context(|| format!("Failed to write master file: {}", config.master_file.display()))?;
    Ok(table)
}
