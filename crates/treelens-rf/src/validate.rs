//! Shared validation of row-major training data.

use crate::error::RfError;

/// Dimensions of a validated training set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Shape {
    pub(crate) n_samples: usize,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

/// Check that `features` is a non-empty rectangular matrix of finite values
/// with one label per row.
///
/// When `n_classes` is `None` the class count is inferred as `max(label) + 1`;
/// otherwise every label must be below it.
pub(crate) fn validate_training_data(
    features: &[Vec<f64>],
    labels: &[usize],
    n_classes: Option<usize>,
) -> Result<Shape, RfError> {
    if features.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    let n_samples = features.len();
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }
    if labels.len() != n_samples {
        return Err(RfError::LabelCountMismatch {
            samples: n_samples,
            labels: labels.len(),
        });
    }

    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        for (feature_index, &val) in row.iter().enumerate() {
            if !val.is_finite() {
                return Err(RfError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
        }
    }

    let inferred = labels.iter().max().copied().unwrap_or(0) + 1;
    let n_classes = match n_classes {
        Some(declared) => {
            if let Some((sample_index, &label)) =
                labels.iter().enumerate().find(|&(_, &l)| l >= declared)
            {
                return Err(RfError::LabelOutOfRange {
                    label,
                    sample_index,
                    n_classes: declared,
                });
            }
            declared
        }
        None => inferred,
    };

    Ok(Shape {
        n_samples,
        n_features,
        n_classes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_class_count_from_labels() {
        let shape = validate_training_data(&[vec![1.0], vec![2.0]], &[0, 2], None).unwrap();
        assert_eq!(shape.n_classes, 3);
        assert_eq!(shape.n_samples, 2);
        assert_eq!(shape.n_features, 1);
    }

    #[test]
    fn declared_class_count_wins() {
        let shape = validate_training_data(&[vec![1.0], vec![2.0]], &[0, 0], Some(4)).unwrap();
        assert_eq!(shape.n_classes, 4);
    }

    #[test]
    fn label_out_of_range() {
        let err = validate_training_data(&[vec![1.0], vec![2.0]], &[0, 3], Some(3)).unwrap_err();
        assert!(matches!(
            err,
            RfError::LabelOutOfRange {
                label: 3,
                sample_index: 1,
                n_classes: 3
            }
        ));
    }

    #[test]
    fn label_count_mismatch() {
        let err = validate_training_data(&[vec![1.0], vec![2.0]], &[0], None).unwrap_err();
        assert!(matches!(err, RfError::LabelCountMismatch { samples: 2, labels: 1 }));
    }
}
