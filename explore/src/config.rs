use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use open_direction::dataset::{DataConfig, SplitConfig};
use open_direction::text::MARKET_STOPWORDS;

/// Inclusive date range of master rows.
///
/// Dates are quoted ISO strings in TOML: `start = "2018-01-02"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn label(&self) -> String {
        format!("{} to {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorrelationConfig {
    /// One matrix is computed per window
    #[serde(default = "default_windows")]
    pub windows: Vec<DateWindow>,
}

fn default_windows() -> Vec<DateWindow> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    vec![
        DateWindow::new(date(2018, 1, 2), date(2022, 12, 30)),
        DateWindow::new(date(2023, 1, 2), date(2023, 12, 29)),
    ]
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            windows: default_windows(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TweetConfig {
    /// One tweet per line
    #[serde(default = "default_tweet_file")]
    pub file: PathBuf,

    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Dropped on top of the English stopword list
    #[serde(default = "default_extra_stopwords")]
    pub extra_stopwords: Vec<String>,

    /// Also draw the frequencies as a bar chart
    #[serde(default = "default_chart")]
    pub chart: bool,
}

fn default_chart() -> bool {
    true
}

fn default_tweet_file() -> PathBuf {
    PathBuf::from("data/tweets/tweets.txt")
}

fn default_top_n() -> usize {
    30
}

fn default_extra_stopwords() -> Vec<String> {
    MARKET_STOPWORDS.iter().map(|s| s.to_string()).collect()
}

impl Default for TweetConfig {
    fn default() -> Self {
        Self {
            file: default_tweet_file(),
            top_n: default_top_n(),
            extra_stopwords: default_extra_stopwords(),
            chart: default_chart(),
        }
    }
}

/// Configuration shared by the exploratory commands
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    /// VIFs and the logit are computed on the training rows of this split
    #[serde(default)]
    pub split: SplitConfig,

    #[serde(default)]
    pub correlations: CorrelationConfig,

    #[serde(default)]
    pub tweets: TweetConfig,

    /// Directory for JSON results and charts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output/explore")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            split: SplitConfig::default(),
            correlations: CorrelationConfig::default(),
            tweets: TweetConfig::default(),
            output_dir: default_output_dir(),
        }
    }
}

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "explore")]
#[command(about = "Exploratory statistics for the open direction study")]
pub struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Master CSV produced by prepare_master
    #[arg(long, global = true)]
    pub master_file: Option<PathBuf>,

    /// Output directory
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Correlation matrix of index daily returns
    Correlations {
        /// First date of a single window (YYYY-MM-DD)
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,

        /// Last date of a single window (YYYY-MM-DD)
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
    },

    /// Variance inflation factors of the feature columns
    Vif {
        /// Feature columns (comma-separated)
        #[arg(long, value_delimiter = ',')]
        features: Option<Vec<String>>,
    },

    /// Coefficient table of an unpenalised logit on the feature columns
    Logit {
        /// Feature columns (comma-separated)
        #[arg(long, value_delimiter = ',')]
        features: Option<Vec<String>>,
    },

    /// Most frequent words of a tweet dump
    Tweets {
        /// Tweet file, one tweet per line
        #[arg(long)]
        file: Option<PathBuf>,

        /// Number of words to list
        #[arg(long)]
        top: Option<usize>,

        /// Skip the bar chart
        #[arg(long)]
        no_chart: bool,
    },
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

    /// Apply the global flags and the subcommand's options
    pub fn apply(&mut self, args: &Args) {
        if let Some(master_file) = &args.master_file {
            self.data.master_file = master_file.clone();
        }
        if let Some(output_dir) = &args.output_dir {
            self.output_dir = output_dir.clone();
        }

        match &args.command {
            Command::Correlations {
                start: Some(start),
                end: Some(end),
            } => {
                self.correlations.windows = vec![DateWindow::new(*start, *end)];
            }
            Command::Correlations { .. } => {}
            Command::Vif { features } | Command::Logit { features } => {
                if let Some(features) = features {
                    self.data.features = features.clone();
                }
            }
            Command::Tweets { file, top, no_chart } => {
                if *no_chart {
                    self.tweets.chart = false;
                }
                if let Some(file) = file {
                    self.tweets.file = file.clone();
                }
                if let Some(top) = top {
                    self.tweets.top_n = *top;
                }
            }
        }
    }

    /// Create configuration from command-line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply(args);
        config.validate()?;
        Ok(config)
    }

    /// Parse the command line; returns the configuration and the command to run
    pub fn load() -> Result<(Self, Command)> {
        let args = Args::parse();
        let config = Self::from_args(&args)?;
        Ok((config, args.command))
    }

    pub fn validate(&self) -> Result<()> {
        self.data.validate()?;

        if !(self.split.test_fraction > 0.0 && self.split.test_fraction < 1.0) {
            anyhow::bail!(
                "test_fraction must be in range (0, 1), got {}",
                self.split.test_fraction
            );
        }

        if self.correlations.windows.is_empty() {
            anyhow::bail!("At least one correlation window is required");
        }
        for window in &self.correlations.windows {
            if window.start > window.end {
                anyhow::bail!("Correlation window starts after it ends: {}", window.label());
            }
        }

        if self.tweets.top_n == 0 {
            anyhow::bail!("top_n must be at least 1");
        }

        Ok(())
    }
}
