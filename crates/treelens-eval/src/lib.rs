//! Classifier evaluation for treelens.
//!
//! Given true labels, predicted labels, predicted class probabilities and
//! class names, [`evaluate`] computes the ROC AUC (binary, or macro one-vs-one
//! for more than two classes), a classification report and a confusion
//! matrix. Nothing is cached; results are a pure function of the inputs.

mod auc;
mod confusion;
mod error;
mod report;
mod validate;

use serde::Serialize;
use tracing::{debug, instrument};

pub use auc::{binary_auc, ovo_macro_auc, roc_auc};
pub use confusion::ConfusionMatrix;
pub use error::EvalError;
pub use report::{ClassificationReport, ReportRow, RowKind};

/// Every metric shown for one trained model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// ROC AUC.
    pub auc: f64,
    /// Per-class and summary precision, recall and F1.
    pub classification_report: ClassificationReport,
    /// Actual vs predicted counts over the classes present.
    pub confusion_matrix: ConfusionMatrix,
}

impl EvaluationReport {
    /// Overall accuracy, taken from the classification report.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.classification_report.accuracy()
    }
}

/// Compute AUC, classification report and confusion matrix.
///
/// `proba[i]` must have one entry per class in `class_names`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`EvalError::EmptyInput`] | Zero samples |
/// | [`EvalError::LengthMismatch`] | Inputs differ in length |
/// | [`EvalError::LabelOutOfRange`] | A label is not below `class_names.len()` |
/// | [`EvalError::ProbabilityWidth`] | A probability row has the wrong width |
/// | [`EvalError::SingleClass`] | Fewer than two classes occur in `actual` |
#[instrument(skip_all, fields(n_samples = actual.len(), n_classes = class_names.len()))]
pub fn evaluate(
    actual: &[usize],
    predicted: &[usize],
    proba: &[Vec<f64>],
    class_names: &[String],
) -> Result<EvaluationReport, EvalError> {
    let classification_report = ClassificationReport::from_labels(actual, predicted, class_names)?;
    let confusion_matrix = ConfusionMatrix::from_labels(actual, predicted, class_names)?;
    let auc = roc_auc(actual, proba, class_names.len())?;
    debug!(auc, accuracy = classification_report.accuracy(), "evaluation complete");

    Ok(EvaluationReport {
        auc,
        classification_report,
        confusion_matrix,
    })
}
