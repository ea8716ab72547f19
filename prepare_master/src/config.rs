use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

use open_direction::dataset::{default_indices, default_master_file};

/// Configuration for building the master table
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding one `{INDEX}.csv` per index
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Indices to merge, in column order
    #[serde(default = "default_indices")]
    pub indices: Vec<String>,

    /// Output path of the merged CSV
    #[serde(default = "default_master_file")]
    pub master_file: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/indices")
}

/// Command-line arguments
#[derive(Parser, Debug, Default)]
#[command(name = "prepare_master")]
#[command(about = "Merge per-index daily OHLC histories into one master CSV")]
pub struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory with the per-index CSV files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Indices to merge (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub indices: Option<Vec<String>>,

    /// Output master CSV
    #[arg(long)]
    pub master_file: Option<PathBuf>,
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
        let config = Config {
            data_dir: args.data_dir.clone().unwrap_or_else(default_data_dir),
            indices: args.indices.clone().unwrap_or_else(default_indices),
            master_file: args.master_file.clone().unwrap_or_else(default_master_file),
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
        if self.indices.is_empty() {
            anyhow::bail!("At least one index is required");
        }

        let mut seen = std::collections::HashSet::new();
        for index in &self.indices {
            if !seen.insert(index) {
                anyhow::bail!("Index {} listed twice", index);
            }
        }

        Ok(())
    }

    /// Input file of one index
    pub fn index_file(&self, index: &str) -> PathBuf {
        self.data_dir.join(format!("{index}.csv"))
    }
}
