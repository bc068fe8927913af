//! Held-out evaluation of a fitted pipeline.

use std::fmt;

use scamscope_core::ScamLabel;
use serde::Serialize;

const CLASSES: [ScamLabel; 2] = [ScamLabel::NonScam, ScamLabel::Scam];

/// Precision, recall and F1 for one class (or an average of classes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Confusion matrix over `[Non-Scam, Scam]`; rows are true labels,
/// columns are predictions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub confusion: [[usize; 2]; 2],
}

impl Evaluation {
    /// Tallies paired true and predicted labels.
    pub fn from_labels(truth: &[ScamLabel], predicted: &[ScamLabel]) -> Self {
        let mut confusion = [[0usize; 2]; 2];
        for (t, p) in truth.iter().zip(predicted) {
            confusion[t.index()][p.index()] += 1;
        }
        Self { confusion }
    }

    pub fn total(&self) -> usize {
        self.confusion.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.confusion[0][0] + self.confusion[1][1], self.total())
    }

    /// Per-class metrics. Zero denominators yield 0.
    pub fn class(&self, label: ScamLabel) -> ClassMetrics {
        let k = label.index();
        let tp = self.confusion[k][k];
        let support = self.confusion[k].iter().sum();
        let predicted = self.confusion.iter().map(|row| row[k]).sum();

        let precision = ratio(tp, predicted);
        let recall = ratio(tp, support);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        ClassMetrics {
            precision,
            recall,
            f1,
            support,
        }
    }

    /// Unweighted mean over both classes.
    pub fn macro_avg(&self) -> ClassMetrics {
        self.average(|_| 0.5)
    }

    /// Support-weighted mean over both classes.
    pub fn weighted_avg(&self) -> ClassMetrics {
        let total = self.total();
        self.average(|m| ratio(m.support, total))
    }

    fn average(&self, weight: impl Fn(&ClassMetrics) -> f64) -> ClassMetrics {
        let mut avg = ClassMetrics {
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
            support: self.total(),
        };
        for label in CLASSES {
            let m = self.class(label);
            let w = weight(&m);
            avg.precision += w * m.precision;
            avg.recall += w * m.recall;
            avg.f1 += w * m.f1;
        }
        avg
    }

    /// Machine-readable summary used by `train --metrics-json`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "accuracy": self.accuracy(),
            "non_scam": self.class(ScamLabel::NonScam),
            "scam": self.class(ScamLabel::Scam),
            "macro_avg": self.macro_avg(),
            "weighted_avg": self.weighted_avg(),
            "confusion_matrix": self.confusion,
        })
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, name: &str, m: ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{name:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
        m.precision, m.recall, m.f1, m.support
    )
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for label in CLASSES {
            write_row(f, &label.to_string(), self.class(label))?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy(),
            self.total()
        )?;
        write_row(f, "macro avg", self.macro_avg())?;
        write_row(f, "weighted avg", self.weighted_avg())?;
        writeln!(f)?;
        writeln!(f, "Confusion matrix (rows = true, cols = predicted):")?;
        for (label, counts) in CLASSES.iter().zip(&self.confusion) {
            writeln!(f, "{:>12} {:>6} {:>6}", label.to_string(), counts[0], counts[1])?;
        }
        Ok(())
    }
}
