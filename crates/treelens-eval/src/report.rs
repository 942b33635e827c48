//! Per-class precision, recall and F1 with summary rows.

use std::fmt;

use serde::Serialize;

use crate::error::EvalError;
use crate::validate::check_labels;

/// What a [`ReportRow`] summarizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// One class.
    Class,
    /// Overall accuracy; only `f1_score` and `support` are meaningful.
    Accuracy,
    /// Unweighted mean of the class rows.
    MacroAvg,
    /// Support-weighted mean of the class rows.
    WeightedAvg,
}

/// One row of a [`ClassificationReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    /// Class name, or `accuracy`, `macro avg`, `weighted avg`.
    pub label: String,
    /// Row kind.
    pub kind: RowKind,
    /// TP / (TP + FP), 0.0 when nothing was predicted as the class.
    pub precision: f64,
    /// TP / (TP + FN), 0.0 when the class has no samples.
    pub recall: f64,
    /// Harmonic mean of precision and recall, 0.0 when both are zero.
    pub f1_score: f64,
    /// Number of true samples covered by the row.
    pub support: usize,
}

/// Classification report: one row per class, then `accuracy`, `macro avg`
/// and `weighted avg`.
///
/// The accuracy row carries the accuracy in all three metric columns and the
/// total sample count as support.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    rows: Vec<ReportRow>,
}

impl ClassificationReport {
    /// Compute the report for every class in `class_names`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::EmptyInput`] | Zero labels provided |
    /// | [`EvalError::LengthMismatch`] | `predicted` and `actual` differ in length |
    /// | [`EvalError::LabelOutOfRange`] | A label is not below `class_names.len()` |
    pub fn from_labels(
        actual: &[usize],
        predicted: &[usize],
        class_names: &[String],
    ) -> Result<Self, EvalError> {
        let n_classes = class_names.len();
        check_labels(actual, predicted, n_classes)?;

        let mut tp = vec![0usize; n_classes];
        let mut predicted_count = vec![0usize; n_classes];
        let mut support = vec![0usize; n_classes];
        for (&a, &p) in actual.iter().zip(predicted) {
            support[a] += 1;
            predicted_count[p] += 1;
            if a == p {
                tp[a] += 1;
            }
        }

        let mut rows: Vec<ReportRow> = class_names
            .iter()
            .enumerate()
            .map(|(c, name)| {
                let precision = ratio(tp[c], predicted_count[c]);
                let recall = ratio(tp[c], support[c]);
                ReportRow {
                    label: name.clone(),
                    kind: RowKind::Class,
                    precision,
                    recall,
                    f1_score: f1(precision, recall),
                    support: support[c],
                }
            })
            .collect();

        let total = actual.len();
        let accuracy = ratio(tp.iter().sum(), total);
        let macro_avg = average(&rows, |_| 1.0, n_classes as f64);
        let weighted_avg = average(&rows, |row| row.support as f64, total as f64);

        rows.push(ReportRow {
            label: "accuracy".to_string(),
            kind: RowKind::Accuracy,
            precision: accuracy,
            recall: accuracy,
            f1_score: accuracy,
            support: total,
        });
        rows.push(ReportRow {
            label: "macro avg".to_string(),
            kind: RowKind::MacroAvg,
            support: total,
            ..macro_avg
        });
        rows.push(ReportRow {
            label: "weighted avg".to_string(),
            kind: RowKind::WeightedAvg,
            support: total,
            ..weighted_avg
        });
        Ok(Self { rows })
    }

    /// All rows, class rows first.
    #[must_use]
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Only the per-class rows.
    pub fn class_rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(|r| r.kind == RowKind::Class)
    }

    /// Overall accuracy.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.rows
            .iter()
            .find(|r| r.kind == RowKind::Accuracy)
            .map_or(0.0, |r| r.f1_score)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Weighted mean of the class rows' metrics; kind, label and support are
/// placeholders for the caller to overwrite.
fn average(rows: &[ReportRow], weight: impl Fn(&ReportRow) -> f64, total_weight: f64) -> ReportRow {
    let mean = |metric: fn(&ReportRow) -> f64| {
        if total_weight == 0.0 {
            0.0
        } else {
            rows.iter().map(|r| weight(r) * metric(r)).sum::<f64>() / total_weight
        }
    };
    ReportRow {
        label: String::new(),
        kind: RowKind::MacroAvg,
        precision: mean(|r| r.precision),
        recall: mean(|r| r.recall),
        f1_score: mean(|r| r.f1_score),
        support: 0,
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for row in &self.rows {
            if row.kind == RowKind::Accuracy {
                writeln!(
                    f,
                    "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
                    row.label, "", "", row.f1_score, row.support
                )?;
            } else {
                writeln!(
                    f,
                    "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                    row.label, row.precision, row.recall, row.f1_score, row.support
                )?;
            }
        }
        Ok(())
    }
}
