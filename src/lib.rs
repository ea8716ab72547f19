pub mod core;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod logging;
pub mod models;
pub mod report;
pub mod resampling;
pub mod text;

pub use error::{EvalError, Result};
pub use evaluation::{MetricsBundle, PartitionMetrics, RemedyOutcome, evaluate, evaluate_with_remedy};
pub use models::Classifier;
pub use resampling::Resampler;
