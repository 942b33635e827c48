/// Errors from metric computation.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Returned when there are no samples to evaluate.
    #[error("cannot evaluate zero samples")]
    EmptyInput,

    /// Returned when parallel inputs have different lengths.
    #[error("{what} has {got} entries, expected {expected}")]
    LengthMismatch {
        /// Which input disagreed.
        what: &'static str,
        /// Length of the true labels.
        expected: usize,
        /// Length of the offending input.
        got: usize,
    },

    /// Returned when a label is not a valid class index.
    #[error("label {label} is out of range for {n_classes} classes")]
    LabelOutOfRange {
        /// The offending label.
        label: usize,
        /// Number of known classes.
        n_classes: usize,
    },

    /// Returned when a probability row does not have one entry per class.
    #[error("probability row {row} has {got} entries, expected {expected}")]
    ProbabilityWidth {
        /// Zero-based sample index.
        row: usize,
        /// Number of classes.
        expected: usize,
        /// Actual row width.
        got: usize,
    },

    /// Returned when AUC is requested but the true labels hold fewer than two classes.
    #[error("AUC is undefined when the true labels contain {n_present} class(es)")]
    SingleClass {
        /// Number of distinct classes in the true labels.
        n_present: usize,
    },
}
