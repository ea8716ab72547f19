use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

use open_direction::dataset::{DataConfig, SplitConfig};
use open_direction::models::{ClassWeight, LogisticRegression};
use open_direction::resampling::ResamplerSpec;

/// One remedy: a class weighting for the model, a training-set resampler,
/// or both.
///
/// ```toml
/// [[remedies]]
/// class_weight = "balanced"
///
/// [[remedies]]
/// resampler = { kind = "smote", k_neighbors = 5 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemedySpec {
    #[serde(default)]
    pub class_weight: ClassWeight,
    #[serde(default)]
    pub resampler: Option<ResamplerSpec>,
}

impl RemedySpec {
    pub fn resample(resampler: ResamplerSpec) -> Self {
        Self {
            class_weight: ClassWeight::None,
            resampler: Some(resampler),
        }
    }
}

/// Configuration for the imbalance remedy comparison
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Master file, target index and feature columns
    #[serde(default)]
    pub data: DataConfig,

    /// Train/test partition, shared by every remedy
    #[serde(default)]
    pub split: SplitConfig,

    /// Logistic regression settings; each remedy sets its own class weight
    #[serde(default = "default_model")]
    pub model: LogisticRegression,

    /// Remedies to evaluate, in report order
    #[serde(default = "default_remedies")]
    pub remedies: Vec<RemedySpec>,

    /// Directory for the `.LOG` report and JSON summary
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Write `remedies.json`
    #[serde(default = "default_json")]
    pub json: bool,
}

fn default_model() -> LogisticRegression {
    LogisticRegression::new(1.0, 1000, ClassWeight::None)
}

/// Balanced class weights, then the four resamplers with seed 0
pub fn default_remedies() -> Vec<RemedySpec> {
    vec![
        RemedySpec {
            class_weight: ClassWeight::Balanced,
            resampler: None,
        },
        RemedySpec::resample(ResamplerSpec::RandomUnder { seed: 0 }),
        RemedySpec::resample(ResamplerSpec::RandomOver { seed: 0 }),
        RemedySpec::resample(ResamplerSpec::Smote {
            k_neighbors: 5,
            seed: 0,
        }),
        RemedySpec::resample(ResamplerSpec::Adasyn {
            n_neighbors: 5,
            seed: 0,
        }),
    ]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output/imbalance_remedies")
}

fn default_json() -> bool {
    true
}

/// Command-line arguments
#[derive(Parser, Debug, Default)]
#[command(name = "imbalance_remedies")]
#[command(about = "Compare class-imbalance remedies for logistic regression")]
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
            model: default_model(),
            remedies: default_remedies(),
            output_dir: args.output_dir.clone().unwrap_or_else(default_output_dir),
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

        if self.remedies.is_empty() {
            anyhow::bail!("At least one remedy is required");
        }

        for remedy in &self.remedies {
            match remedy.resampler {
                Some(ResamplerSpec::Smote { k_neighbors: 0, .. })
                | Some(ResamplerSpec::Adasyn { n_neighbors: 0, .. }) => {
                    anyhow::bail!("Neighbour counts must be greater than 0");
                }
                _ => {}
            }
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
        assert_eq!(config.remedies.len(), 5);
        assert_eq!(config.remedies[0].class_weight, ClassWeight::Balanced);
        assert_eq!(config.model.max_iter, 1000);
    }

    #[test]
    fn test_from_toml() {
        let text = r#"
            [model]
            max_iter = 500

            [[remedies]]
            class_weight = "balanced"

            [[remedies]]
            resampler = { kind = "adasyn", n_neighbors = 3, seed = 9 }
        "#;
        let config: Config = toml::from_str(text).unwrap();
        config.validate().unwrap();

        assert_eq!(config.model.max_iter, 500);
        assert_eq!(
            config.remedies[1].resampler,
            Some(ResamplerSpec::Adasyn {
                n_neighbors: 3,
                seed: 9
            })
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::from_args(&Args::default()).unwrap();
        config.remedies = vec![RemedySpec::resample(ResamplerSpec::Smote {
            k_neighbors: 0,
            seed: 0,
        })];
        assert!(config.validate().is_err());

        config.remedies.clear();
        assert!(config.validate().is_err());
    }
}
