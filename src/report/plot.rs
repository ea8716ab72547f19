//! ROC curve charts.

use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::info;

use crate::error::{EvalError, Result};
use crate::evaluation::{MetricsBundle, Partition, RocCurve};

/// `{dir}/{model}_{partition}_roc.png`, model name lower-cased with
/// non-alphanumerics replaced by `_`
pub fn roc_plot_path<P: AsRef<Path>>(dir: P, model: &str, partition: Partition) -> PathBuf {
    let stem: String = model
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    dir.as_ref().join(format!("{stem}_{partition}_roc.png"))
}

fn draw_roc(roc: &RocCurve, title: &str, auc: f64, path: &Path) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (1280, 720)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..1f64, 0f64..1f64)?;

    chart
        .configure_mesh()
        .x_desc("False Positive Rate")
        .y_desc("True Positive Rate")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            roc.fpr.iter().zip(&roc.tpr).map(|(&x, &y)| (x, y)),
            &BLUE,
        ))?
        .label(format!("ROC (AUC = {auc:.3})"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .draw_series(LineSeries::new(vec![(0.0, 0.0), (1.0, 1.0)], &BLACK.mix(0.4)))?
        .label("Chance")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK.mix(0.4)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Render one ROC curve to a PNG file, creating parent directories
pub fn plot_roc<P: AsRef<Path>>(roc: &RocCurve, title: &str, auc: f64, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    draw_roc(roc, title, auc, path).map_err(|e| EvalError::Plot(e.to_string()))
}

/// Train and test ROC charts of one model; returns the written paths
pub fn plot_bundle<P: AsRef<Path>>(bundle: &MetricsBundle, dir: P) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(2);
    for (partition, metrics, label) in [
        (Partition::Train, &bundle.train, "Train Data"),
        (Partition::Test, &bundle.test, "Test Data"),
    ] {
        let path = roc_plot_path(dir.as_ref(), &bundle.model, partition);
        plot_roc(&metrics.roc, &format!("{} - {label}", bundle.model), metrics.auc, &path)?;
        info!(path = %path.display(), "ROC curve saved");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roc_plot_path() {
        let path = roc_plot_path("out", "Logistic Regression (balanced)", Partition::Test);
        assert_eq!(
            path,
            PathBuf::from("out/logistic_regression__balanced__test_roc.png")
        );
    }
}
