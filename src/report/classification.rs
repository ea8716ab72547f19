use crate::evaluation::ConfusionTable;

const CLASS_NAMES: [&str; 2] = ["0.0", "1.0"];
const NAME_WIDTH: usize = 12;

/// Precision, recall and F1 of one class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 { 0.0 } else { num as f64 / denom as f64 }
}

/// Per-class scores; zero denominators score 0
pub fn class_scores(table: &ConfusionTable) -> [ClassScores; 2] {
    [0, 1].map(|c| {
        let correct = table.counts[c][c];
        let precision = ratio(correct, table.predicted(c));
        let recall = ratio(correct, table.support(c));
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        ClassScores {
            precision,
            recall,
            f1,
            support: table.support(c),
        }
    })
}

fn score_row(name: &str, p: f64, r: f64, f1: f64, support: usize) -> String {
    format!("{name:>width$}  {p:>9.2} {r:>9.2} {f1:>9.2} {support:>9}\n", width = NAME_WIDTH)
}

/// Per-class precision/recall/F1 table with accuracy, macro and
/// support-weighted averages.
pub fn classification_report(table: &ConfusionTable) -> String {
    let scores = class_scores(table);
    let total = table.total();

    let mut out = format!(
        "{:>width$}  {:>9} {:>9} {:>9} {:>9}\n\n",
        "",
        "precision",
        "recall",
        "f1-score",
        "support",
        width = NAME_WIDTH
    );
    for (name, s) in CLASS_NAMES.iter().zip(&scores) {
        out.push_str(&score_row(name, s.precision, s.recall, s.f1, s.support));
    }
    out.push('\n');

    let accuracy = ratio(table.tp() + table.tn(), total);
    out.push_str(&format!(
        "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}\n",
        "accuracy",
        "",
        "",
        accuracy,
        total,
        width = NAME_WIDTH
    ));

    let macro_avg = |f: fn(&ClassScores) -> f64| scores.iter().map(f).sum::<f64>() / 2.0;
    out.push_str(&score_row(
        "macro avg",
        macro_avg(|s| s.precision),
        macro_avg(|s| s.recall),
        macro_avg(|s| s.f1),
        total,
    ));

    let weighted = |f: fn(&ClassScores) -> f64| {
        if total == 0 {
            0.0
        } else {
            scores.iter().map(|s| f(s) * s.support as f64).sum::<f64>() / total as f64
        }
    };
    out.push_str(&score_row(
        "weighted avg",
        weighted(|s| s.precision),
        weighted(|s| s.recall),
        weighted(|s| s.f1),
        total,
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ConfusionTable {
        ConfusionTable {
            counts: [[265, 233], [126, 596]],
        }
    }

    #[test]
    fn test_class_scores() {
        let [neg, pos] = class_scores(&table());
        assert_eq!(neg.support, 391);
        assert_eq!(pos.support, 829);
        assert!((neg.precision - 265.0 / 498.0).abs() < 1e-12);
        assert!((pos.recall - 596.0 / 829.0).abs() < 1e-12);
    }

    #[test]
    fn test_report_layout() {
        let report = classification_report(&table());
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(
            lines[0],
            "              precision    recall  f1-score   support"
        );
        assert_eq!(lines[1], "");
        assert_eq!(
            lines[2],
            "         0.0       0.53      0.68      0.60       391"
        );
        assert_eq!(
            lines[3],
            "         1.0       0.83      0.72      0.77       829"
        );
        assert_eq!(
            lines[5],
            "    accuracy                           0.71      1220"
        );
        assert_eq!(
            lines[6],
            "   macro avg       0.68      0.70      0.68      1220"
        );
        assert_eq!(
            lines[7],
            "weighted avg       0.73      0.71      0.71      1220"
        );
    }

    #[test]
    fn test_empty_predictions_score_zero() {
        let t = ConfusionTable {
            counts: [[3, 4], [0, 0]],
        };
        let [_, pos] = class_scores(&t);
        assert_eq!(pos.precision, 0.0);
        assert_eq!(pos.f1, 0.0);
    }
}
