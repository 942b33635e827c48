//! In-memory labeled datasets.

use crate::{DataError, DatasetName};

/// A labeled classification dataset.
///
/// Feature rows, targets, feature names and class names are parallel:
/// `features[i]` has label `target[i]`, every row has `feature_names.len()`
/// values and every target is below `class_names.len()`. Immutable after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: DatasetName,
    features: Vec<Vec<f64>>,
    target: Vec<usize>,
    feature_names: Vec<String>,
    class_names: Vec<String>,
}

impl Dataset {
    /// Build a dataset, checking that the parallel vectors agree.
    ///
    /// # Errors
    ///
    /// | Variant                      | When                                          |
    /// |------------------------------|-----------------------------------------------|
    /// | [`DataError::EmptyDataset`]  | `features` is empty                           |
    /// | [`DataError::ShapeMismatch`] | lengths disagree or a target is out of range  |
    pub fn new(
        name: DatasetName,
        features: Vec<Vec<f64>>,
        target: Vec<usize>,
        feature_names: Vec<String>,
        class_names: Vec<String>,
    ) -> Result<Self, DataError> {
        if features.is_empty() {
            return Err(DataError::EmptyDataset { dataset: name });
        }
        if features.len() != target.len() {
            return Err(DataError::ShapeMismatch {
                reason: format!("{} rows but {} targets", features.len(), target.len()),
            });
        }
        if let Some((row_index, row)) = features
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != feature_names.len())
        {
            return Err(DataError::ShapeMismatch {
                reason: format!(
                    "row {row_index} has {} values but there are {} feature names",
                    row.len(),
                    feature_names.len()
                ),
            });
        }
        if let Some(&label) = target.iter().find(|&&t| t >= class_names.len()) {
            return Err(DataError::ShapeMismatch {
                reason: format!("target {label} is out of range for {} classes", class_names.len()),
            });
        }
        Ok(Self {
            name,
            features,
            target,
            feature_names,
            class_names,
        })
    }

    /// Return the dataset name.
    #[must_use]
    pub fn name(&self) -> DatasetName {
        self.name
    }

    /// Row-major feature matrix.
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Zero-based class index per row.
    #[must_use]
    pub fn target(&self) -> &[usize] {
        &self.target
    }

    /// Feature column names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Class names, indexed by class.
    #[must_use]
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Number of rows.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.class_names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn valid_dataset_reports_shape() {
        let ds = Dataset::new(
            DatasetName::Iris,
            vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
            vec![0, 1, 1],
            names(&["a", "b"]),
            names(&["x", "y"]),
        )
        .unwrap();
        assert_eq!(ds.n_samples(), 3);
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.n_classes(), 2);
    }

    #[test]
    fn target_out_of_range_rejected() {
        let err = Dataset::new(
            DatasetName::Iris,
            vec![vec![1.0]],
            vec![2],
            names(&["a"]),
            names(&["x", "y"]),
        )
        .unwrap_err();
        assert!(matches!(err, DataError::ShapeMismatch { .. }));
    }

    #[test]
    fn feature_name_count_must_match_columns() {
        let err = Dataset::new(
            DatasetName::Wine,
            vec![vec![1.0, 2.0]],
            vec![0],
            names(&["a"]),
            names(&["x"]),
        )
        .unwrap_err();
        assert!(matches!(err, DataError::ShapeMismatch { .. }));
    }

    #[test]
    fn empty_rejected() {
        let err = Dataset::new(DatasetName::Wine, vec![], vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, DataError::EmptyDataset { dataset: DatasetName::Wine }));
    }
}
