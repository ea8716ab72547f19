//! Text, JSON and chart rendering of evaluation results.
//!
//! Everything here works on the data returned by [`crate::evaluation`];
//! nothing feeds back into the metrics.

mod classification;
mod plot;
mod summary;

pub use classification::{ClassScores, classification_report, class_scores};
pub use plot::{plot_bundle, plot_roc, roc_plot_path};
pub use summary::{
    class_balance, comparison_table, confusion_display, format_float, model_report, remedy_heading,
    remedy_report, write_log,
};
