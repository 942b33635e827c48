//! Shared input checks.

use crate::error::EvalError;

/// Non-empty, equal-length label vectors with every label below `n_classes`.
pub(crate) fn check_labels(
    actual: &[usize],
    predicted: &[usize],
    n_classes: usize,
) -> Result<(), EvalError> {
    if actual.is_empty() {
        return Err(EvalError::EmptyInput);
    }
    if predicted.len() != actual.len() {
        return Err(EvalError::LengthMismatch {
            what: "predicted labels",
            expected: actual.len(),
            got: predicted.len(),
        });
    }
    check_range(actual, n_classes)?;
    check_range(predicted, n_classes)
}

/// One `n_classes`-wide probability row per label.
pub(crate) fn check_probabilities(
    labels: &[usize],
    proba: &[Vec<f64>],
    n_classes: usize,
) -> Result<(), EvalError> {
    if labels.is_empty() {
        return Err(EvalError::EmptyInput);
    }
    if proba.len() != labels.len() {
        return Err(EvalError::LengthMismatch {
            what: "probabilities",
            expected: labels.len(),
            got: proba.len(),
        });
    }
    if let Some((row, p)) = proba.iter().enumerate().find(|(_, p)| p.len() != n_classes) {
        return Err(EvalError::ProbabilityWidth {
            row,
            expected: n_classes,
            got: p.len(),
        });
    }
    check_range(labels, n_classes)
}

fn check_range(labels: &[usize], n_classes: usize) -> Result<(), EvalError> {
    match labels.iter().find(|&&l| l >= n_classes) {
        Some(&label) => Err(EvalError::LabelOutOfRange { label, n_classes }),
        None => Ok(()),
    }
}
