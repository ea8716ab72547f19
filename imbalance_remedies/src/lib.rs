pub mod config;

pub use config::{Config, RemedySpec};

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use open_direction::core::io::write_json;
use open_direction::dataset::Dataset;
use open_direction::models::{ClassWeight, LogisticRegression};
use open_direction::report::{remedy_report, write_log};
use open_direction::{RemedyOutcome, evaluate_with_remedy};

/// Remedy id when no resampler runs
fn weighting_id(class_weight: ClassWeight) -> &'static str {
    match class_weight {
        ClassWeight::None => "none",
        ClassWeight::Balanced => "balanced",
    }
}

/// Evaluate one remedy on the configured split
pub fn run_remedy(dataset: &Dataset, config: &Config, remedy: &RemedySpec) -> Result<RemedyOutcome> {
    let mut model: LogisticRegression = config.model.clone();
    model.class_weight = remedy.class_weight;

    let mut outcome = match &remedy.resampler {
        Some(spec) => {
            let mut resampler = spec.build();
            evaluate_with_remedy(Some(resampler.as_mut()), &mut model, &dataset.x, &dataset.y, &config.split)?
        }
        None => {
            let mut outcome = evaluate_with_remedy(None, &mut model, &dataset.x, &dataset.y, &config.split)?;
            outcome.remedy = weighting_id(remedy.class_weight).to_string();
            outcome
        }
    };
    if remedy.resampler.is_some() && remedy.class_weight == ClassWeight::Balanced {
        outcome.remedy.push_str(" + balanced");
    }

    info!(
        remedy = %outcome.remedy,
        train_before = outcome.n_train_before,
        train_after = outcome.n_train_after,
        test_auc = outcome.bundle.test.auc,
        "remedy evaluated"
    );
    Ok(outcome)
}

/// Evaluate every configured remedy; the first failure aborts the run
pub fn run_all(dataset: &Dataset, config: &Config) -> Result<Vec<RemedyOutcome>> {
    config
        .remedies
        .iter()
        .map(|remedy| {
            run_remedy(dataset, config, remedy)
                .with_context(|| format!("Remedy {:?} failed", remedy.resampler))
        })
        .collect()
}

/// Write the combined `.LOG` report and the JSON summary
pub fn write_outputs(outcomes: &[RemedyOutcome], config: &Config) -> Result<Vec<PathBuf>> {
    let text: String = outcomes.iter().map(remedy_report).collect();
    let mut written = vec![write_log(&config.output_dir, "imbalance remedies", &text)?];

    if config.json {
        let path = config.output_dir.join("remedies.json");
        write_json(&path, outcomes)
            .with_context(|| format!("Failed to write summary: {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// Load the configured dataset
pub fn load(config: &Config) -> Result<Dataset> {
    config.data.load().with_context(|| {
        format!(
            "Failed to build dataset from {}",
            config.data.master_file.display()
        )
    })
}
