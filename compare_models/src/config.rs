use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

use open_direction::dataset::{DataConfig, SplitConfig};
use open_direction::models::{ModelSpec, default_models};

/// Configuration for the model comparison
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Master file, target index and feature columns
    #[serde(default)]
    pub data: DataConfig,

    /// Train/test partition
    #[serde(default)]
    pub split: SplitConfig,

    /// Models to evaluate, in report order
    #[serde(default = "default_models")]
    pub models: Vec<ModelSpec>,

    /// Directory for `.LOG` reports, plots and the JSON summary
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Render train and test ROC curves per model
    #[serde(default)]
    pub plot: bool,

    /// Write `summary.json`
    #[serde(default = "default_json")]
    pub json: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output/compare_models")
}

fn default_json() -> bool {
    true
}

/// Command-line arguments
#[derive(Parser, Debug, Default)]
#[command(name = "compare_models")]
#[command(about = "Compare classifiers on next-day index open direction")]
pub struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Master CSV produced by prepare_master
    #[arg(long)]
    pub master_file: Option<PathBuf>,

    /// Index whose opening direction is predicted
    #[arg(long)]
    pub target: Option<String>,

    /// Feature columns (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub features: Option<Vec<String>>,

    /// Split seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Render ROC curves
    #[arg(long)]
    pub plot: bool,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from command-line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut data = DataConfig::default();
        if let Some(master_file) = &args.master_file {
            data.master_file = master_file.clone();
        }
        if let Some(target) = &args.target {
            data.target = target.clone();
        }
        if let Some(features) = &args.features {
            data.features = features.clone();
        }

        let mut split = SplitConfig::default();
        if let Some(seed) = args.seed {
            split.seed = seed;
        }

        let config = Config {
            data,
            split,
            models: default_models(),
            output_dir: args.output_dir.clone().unwrap_or_else(default_output_dir),
            plot: args.plot,
            json: default_json(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from either file or command-line arguments
    pub fn load() -> Result<Self> {
        let args = Args::parse();

        if let Some(config_path) = &args.config {
            Self::from_file(config_path)
        } else {
            Self::from_args(&args)
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.data.validate()?;

        if !(self.split.test_fraction > 0.0 && self.split.test_fraction < 1.0) {
            anyhow::bail!(
                "test_fraction must be in range (0, 1), got {}",
                self.split.test_fraction
            );
        }

        if self.models.is_empty() {
            anyhow::bail!("At least one model is required");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_args() {
        let config = Config::from_args(&Args::default()).unwrap();
        assert_eq!(config.models.len(), 7);
        assert_eq!(config.split.seed, 1337);
        assert!(config.json);
        assert!(!config.plot);
    }

    #[test]
    fn test_from_toml() {
        let text = r#"
            output_dir = "out"
            plot = true

            [data]
            target = "DJI"
            features = ["NSEI_DAILY_RETURNS"]

            [split]
            seed = 7

            [[models]]
            kind = "knn"
            n_neighbors = 15
            scaler = "standard"

            [[models]]
            kind = "logistic_regression"
            name = "LR (balanced)"
            class_weight = "balanced"
        "#;
        let config: Config = toml::from_str(text).unwrap();
        config.validate().unwrap();

        assert_eq!(config.data.target, "DJI");
        assert_eq!(config.split.seed, 7);
        assert_eq!(config.split.test_fraction, 0.2);
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[1].build().name(), "LR (balanced)");
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::from_args(&Args::default()).unwrap();
        config.split.test_fraction = 1.0;
        assert!(config.validate().is_err());

        config.split.test_fraction = 0.2;
        config.models.clear();
        assert!(config.validate().is_err());
    }
}
