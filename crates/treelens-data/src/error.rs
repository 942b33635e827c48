//! Error types for treelens-data.

use std::path::PathBuf;

use crate::DatasetName;

/// Errors from dataset download, parsing and splitting.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Returned when a dataset name is not one of the known datasets.
    #[error("unknown dataset \"{name}\", expected one of Iris, Wine, Covertype")]
    UnknownDataset {
        /// The name that failed to parse.
        name: String,
    },

    /// Returned when the HTTP request for a remote dataset fails.
    #[error("failed to download {dataset} from {url}")]
    Download {
        /// Dataset being fetched.
        dataset: DatasetName,
        /// Source URL.
        url: String,
        /// Underlying HTTP error.
        source: reqwest::Error,
    },

    /// Returned when a file in the data home cannot be created, written or read.
    #[error("I/O error on {path}")]
    Io {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {dataset} at line {line}")]
    CsvParse {
        /// Dataset being parsed.
        dataset: DatasetName,
        /// One-based line number where the error occurred, 0 if unknown.
        line: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a row has a different number of columns than the first row.
    #[error("inconsistent row length in {dataset}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Dataset being parsed.
        dataset: DatasetName,
        /// Zero-based data row index.
        row_index: usize,
        /// Expected number of columns.
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a feature cell is NaN, infinite or not a number.
    #[error("non-finite value in {dataset}: row {row_index}, column {col_index}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Dataset being parsed.
        dataset: DatasetName,
        /// Zero-based data row index.
        row_index: usize,
        /// Zero-based column index in the source file.
        col_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when the source has no data rows.
    #[error("{dataset} has no data rows")]
    EmptyDataset {
        /// Dataset being parsed.
        dataset: DatasetName,
    },

    /// Returned when the number of class names does not match the distinct labels.
    #[error("{dataset} has {found} distinct labels but {expected} class names")]
    ClassCountMismatch {
        /// Dataset being parsed.
        dataset: DatasetName,
        /// Number of known class names.
        expected: usize,
        /// Number of distinct labels found.
        found: usize,
    },

    /// Returned when a dataset's parallel vectors disagree in length.
    #[error("dataset shape mismatch: {reason}")]
    ShapeMismatch {
        /// What disagreed.
        reason: String,
    },

    /// Returned when the test fraction is not in (0.0, 1.0).
    #[error("test fraction must be in (0, 1), got {test_fraction}")]
    InvalidTestFraction {
        /// The invalid fraction.
        test_fraction: f64,
    },

    /// Returned when a split would leave the train or test set empty.
    #[error("cannot split {n_samples} samples with test fraction {test_fraction}")]
    TooFewSamples {
        /// Number of samples in the dataset.
        n_samples: usize,
        /// Requested test fraction.
        test_fraction: f64,
    },
}
