pub mod config;
pub mod correlations;
pub mod logit;
pub mod tweets;
pub mod vif;

pub use config::{Command, Config, DateWindow};
pub use correlations::{CorrelationMatrix, return_correlations};
pub use logit::{LogitTerm, logit_header, logit_summary, training_logit};
pub use tweets::{WordCount, frequency_table, plot_frequencies, tweet_frequencies};
pub use vif::{FeatureVif, feature_vifs, training_vifs};

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use open_direction::core::io::{read_master_file, write_json};
use open_direction::dataset::{Dataset, MasterTable, derive_features};

/// Master table with derived columns for every configured index
pub fn returns_table(config: &Config) -> Result<MasterTable> {
    let path = &config.data.master_file;
    let mut table = read_master_file(path)
        .with_context(|| format!("Failed to read master file: {}", path.display()))?;
    derive_features(&mut table, &config.data.indices, &config.data.indicators)?;
    Ok(table)
}

/// One correlation matrix per configured window
pub fn correlations(config: &Config) -> Result<Vec<CorrelationMatrix>> {
    let table = returns_table(config)?;
    config
        .correlations
        .windows
        .iter()
        .map(|window| -> Result<CorrelationMatrix> {
            let matrix = return_correlations(&table, &config.data.indices, window)?;
            info!(window = %window.label(), rows = matrix.n_rows, "correlations computed");
            Ok(matrix)
        })
        .collect()
}

fn dataset(config: &Config) -> Result<Dataset> {
    config.data.load().with_context(|| {
        format!(
            "Failed to build dataset from {}",
            config.data.master_file.display()
        )
    })
}

/// VIFs of the configured features over the training rows
pub fn vifs(config: &Config) -> Result<Vec<FeatureVif>> {
    training_vifs(&dataset(config)?, &config.split)
}

/// Unpenalised logit of the label on the configured features, training rows only
pub fn logit(config: &Config) -> Result<Vec<LogitTerm>> {
    training_logit(&dataset(config)?, &config.split)
}

/// Word frequencies of the configured tweet dump
pub fn tweets(config: &Config) -> Result<Vec<WordCount>> {
    tweet_frequencies(
        &config.tweets.file,
        &config.tweets.extra_stopwords,
        config.tweets.top_n,
    )
}

/// Bar chart of the word counts at `{output_dir}/tweet_words.png`
pub fn tweet_chart(config: &Config, counts: &[WordCount]) -> Result<PathBuf> {
    let path = config.output_dir.join("tweet_words.png");
    let title = format!("Top {} words", counts.len());
    plot_frequencies(counts, &title, &path)?;
    Ok(path)
}

/// Write `{output_dir}/{name}.json`
pub fn write_result<T: Serialize + ?Sized>(config: &Config, name: &str, value: &T) -> Result<PathBuf> {
    let path = config.output_dir.join(format!("{name}.json"));
    write_json(&path, value).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
