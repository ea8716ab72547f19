pub mod config;

pub use config::Config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use open_direction::core::io::write_json;
use open_direction::dataset::{Dataset, train_test_split};
use open_direction::report::{model_report, plot_bundle, write_log};
use open_direction::{MetricsBundle, evaluate};

/// Evaluate every configured model on one shared train/test split.
///
/// A model that fails to fit is logged and left out; the comparison only
/// fails when no model could be evaluated.
pub fn compare(dataset: &Dataset, config: &Config) -> Result<Vec<MetricsBundle>> {
    let split = train_test_split(&dataset.x, &dataset.y, &config.split)?;
    info!(
        train = split.y_train.len(),
        test = split.y_test.len(),
        seed = config.split.seed,
        "dataset split"
    );

    let mut bundles = Vec::with_capacity(config.models.len());
    for spec in &config.models {
        let mut model = spec.build();
        let name = model.name();
        match evaluate(model.as_mut(), &split.x_train, &split.x_test, &split.y_train, &split.y_test) {
            Ok(bundle) => {
                info!(
                    model = %name,
                    threshold = bundle.threshold,
                    test_auc = bundle.test.auc,
                    "model evaluated"
                );
                bundles.push(bundle);
            }
            Err(e) => warn!(model = %name, error = %e, "model skipped"),
        }
    }

    if bundles.is_empty() {
        anyhow::bail!("None of the {} configured models could be evaluated", config.models.len());
    }
    Ok(bundles)
}

/// Write per-model `.LOG` reports, optional ROC charts and the JSON summary.
/// Returns the paths written.
pub fn write_outputs(bundles: &[MetricsBundle], label: &str, config: &Config) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for bundle in bundles {
        let text = model_report(bundle, label);
        written.push(write_log(&config.output_dir, &bundle.model, &text)?);
        if config.plot {
            written.extend(plot_bundle(bundle, config.output_dir.join("plots"))?);
        }
    }

    if config.json {
        let path = config.output_dir.join("summary.json");
        write_json(&path, bundles)
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
