use std::path::{Path, PathBuf};

use tracing::info;

use super::classification_report;
use crate::core::io::write_file;
use crate::dataset::class_counts;
use crate::error::Result;
use crate::evaluation::{ConfusionTable, MetricsBundle, RemedyOutcome, round_to};

/// Shortest round-trip rendering, keeping a `.0` on whole numbers
pub fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// Cross-tabulation of predicted rows against actual columns.
///
/// ```text
/// NSEI_OPEN_DIR  0.0  1.0
/// row_0
/// 0              265  233
/// 1              126  596
/// ```
pub fn confusion_display(table: &ConfusionTable, label: &str) -> String {
    let index_width = label.len().max("row_0".len());
    let widths: Vec<usize> = (0..2)
        .map(|c| {
            let longest = (0..2).map(|r| table.counts[r][c].to_string().len()).max().unwrap_or(1);
            longest.max(3)
        })
        .collect();
    let full_width = index_width + widths.iter().map(|w| w + 2).sum::<usize>();

    let mut out = format!("{label:<index_width$}");
    for (name, w) in ["0.0", "1.0"].iter().zip(&widths) {
        out.push_str(&format!("  {name:>w$}"));
    }
    out.push('\n');
    out.push_str(&format!("{:<full_width$}\n", "row_0"));
    for (r, row) in table.counts.iter().enumerate() {
        out.push_str(&format!("{r:<index_width$}"));
        for (v, w) in row.iter().zip(&widths) {
            out.push_str(&format!("  {v:>w$}"));
        }
        out.push('\n');
    }
    out.pop();
    out
}

/// Full per-model report: classification reports and confusion tables for
/// both partitions, then sensitivity, specificity and AUC at the cutoff.
pub fn model_report(bundle: &MetricsBundle, label: &str) -> String {
    let cutoff = format_float(round_to(bundle.threshold, 3));
    let (train, test) = (&bundle.train, &bundle.test);

    let mut out = format!("\n{}\n", bundle.model);
    out.push_str(&format!("{}\n", classification_report(&train.confusion)));
    out.push_str(&format!(
        "\nTrain Data - Confusion Matrix:\n{}\n\n",
        confusion_display(&train.confusion, label)
    ));
    out.push_str(&format!("{}\n", classification_report(&test.confusion)));
    out.push_str(&format!(
        "\n Test Data - Confusion Matrix:\n{}\n\n",
        confusion_display(&test.confusion, label)
    ));
    out.push('\n');

    out.push_str(&format!(
        "Train Data - Sensitivity for cut-off {cutoff}: {}%\n",
        format_float(train.sensitivity)
    ));
    out.push_str(&format!(
        " Test Data - Sensitivity for cut-off {cutoff}: {}%\n\n",
        format_float(test.sensitivity)
    ));
    out.push_str(&format!(
        "Train Data - Specificity for cut-off {cutoff}: {}%\n",
        format_float(train.specificity)
    ));
    out.push_str(&format!(
        " Test Data - Specificity for cut-off {cutoff}: {}%\n\n",
        format_float(test.specificity)
    ));
    out.push_str(&format!("Train Data - AUC ROC: {}\n", format_float(train.auc)));
    out.push_str(&format!(" Test Data - AUC ROC: {}\n\n", format_float(test.auc)));
    out
}

/// Report heading of a remedy id; class weighting alone is named after the model option
pub fn remedy_heading(remedy: &str) -> String {
    match remedy {
        "balanced" => "LogisticRegression - class_weight: balanced".to_string(),
        other => other.to_string(),
    }
}

/// Test-partition summary of one imbalance remedy
pub fn remedy_report(outcome: &RemedyOutcome) -> String {
    let test = &outcome.bundle.test;
    format!(
        "\n {}\n\n     AUC ROC: {:.3}\n\n   Threshold: {}\n\n    Accuracy: {:.3}\n Sensitivity: {:.3}%\n Specificity: {:.3}%\n",
        remedy_heading(&outcome.remedy),
        test.auc,
        format_float(round_to(outcome.bundle.threshold, 3)),
        test.accuracy,
        test.sensitivity,
        test.specificity
    )
}

/// Label frequencies, most common first, with the majority share
pub fn class_balance(y: &[u8], label: &str) -> String {
    let counts = class_counts(y);
    let mut order = [1usize, 0];
    order.sort_by(|&a, &b| counts[b].cmp(&counts[a]));

    let width = label.len();
    let mut out = format!("{label}  {:>6}\n", "Freq");
    for class in order {
        out.push_str(&format!("{class:>width$}  {:>6}\n", counts[class]));
    }
    let majority = counts[order[0]] as f64 / y.len().max(1) as f64;
    out.push_str(&format!("majority share: {:.3}\n", majority));
    out
}

/// One line per model with the headline metrics of both partitions
pub fn comparison_table(bundles: &[MetricsBundle]) -> String {
    let name_width = bundles
        .iter()
        .map(|b| b.model.len())
        .max()
        .unwrap_or(5)
        .max("Model".len());

    let mut out = format!(
        "{:<name_width$}  {:>9}  {:>9}  {:>8}  {:>9}  {:>9}  {:>8}\n",
        "Model", "Cut-off", "Train AUC", "Test AUC", "Test Sens", "Test Spec", "Test Acc"
    );
    for b in bundles {
        out.push_str(&format!(
            "{:<name_width$}  {:>9.3}  {:>9.3}  {:>8.3}  {:>9.2}  {:>9.2}  {:>8.3}\n",
            b.model,
            b.threshold,
            b.train.auc,
            b.test.auc,
            b.test.sensitivity,
            b.test.specificity,
            b.test.accuracy
        ));
    }
    out
}

/// Write `text` to `{dir}/{NAME}.LOG`, the name upper-cased with runs of
/// non-alphanumerics collapsed to `_`.
pub fn write_log<P: AsRef<Path>>(dir: P, name: &str, text: &str) -> Result<PathBuf> {
    let mut stem = String::new();
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_uppercase());
        } else if !stem.is_empty() && !stem.ends_with('_') {
            stem.push('_');
        }
    }
    let stem = stem.trim_end_matches('_');

    let path = dir.as_ref().join(format!("{stem}.LOG"));
    write_file(&path, text)?;
    info!(path = %path.display(), "report written");
    Ok(path)
}
