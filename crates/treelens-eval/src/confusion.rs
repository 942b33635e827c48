//! Labeled confusion matrix.

use std::fmt;

use serde::Serialize;

use crate::error::EvalError;
use crate::validate::check_labels;

/// Cross-tabulation of actual (rows) against predicted (columns) classes.
///
/// Only classes that occur in the actual or the predicted labels get a row
/// and a column, in class-index order, so the matrix is always square.
/// Entry `counts[i][j]` counts samples of class `classes[i]` that were
/// predicted as `classes[j]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    classes: Vec<usize>,
    names: Vec<String>,
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Build the matrix from actual and predicted class indices.
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
        check_labels(actual, predicted, class_names.len())?;

        let mut present = vec![false; class_names.len()];
        for &c in actual.iter().chain(predicted) {
            present[c] = true;
        }
        let classes: Vec<usize> = (0..class_names.len()).filter(|&c| present[c]).collect();
        let mut position = vec![usize::MAX; class_names.len()];
        for (pos, &c) in classes.iter().enumerate() {
            position[c] = pos;
        }

        let mut counts = vec![vec![0usize; classes.len()]; classes.len()];
        for (&a, &p) in actual.iter().zip(predicted) {
            counts[position[a]][position[p]] += 1;
        }
        let names = classes.iter().map(|&c| class_names[c].clone()).collect();
        Ok(Self {
            classes,
            names,
            counts,
        })
    }

    /// Class indices of the rows and columns.
    #[must_use]
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    /// Class names of the rows and columns.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Matrix rows, one per actual class.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.counts
    }

    /// Number of rows (and columns).
    #[must_use]
    pub fn size(&self) -> usize {
        self.classes.len()
    }

    /// Per-row totals: how many samples actually belong to each class.
    #[must_use]
    pub fn actual_totals(&self) -> Vec<usize> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    /// Per-column totals: how often each class was predicted.
    #[must_use]
    pub fn predicted_totals(&self) -> Vec<usize> {
        (0..self.size())
            .map(|j| self.counts.iter().map(|row| row[j]).sum())
            .collect()
    }

    /// Proportion of samples on the diagonal.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.size()).map(|i| self.counts[i][i]).sum();
        let total: usize = self.counts.iter().flatten().sum();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .names
            .iter()
            .map(String::len)
            .chain(std::iter::once("Actual".len()))
            .max()
            .unwrap_or(0);

        write!(f, "{:>width$}", "Actual")?;
        for name in &self.names {
            write!(f, " {name:>width$}")?;
        }
        writeln!(f)?;

        for (name, row) in self.names.iter().zip(&self.counts) {
            write!(f, "{name:>width$}")?;
            for count in row {
                write!(f, " {count:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
