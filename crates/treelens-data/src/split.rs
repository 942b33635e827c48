//! Deterministic train/test partitioning.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::{DataError, Dataset};

/// Train/test partition of a [`Dataset`].
///
/// `test_indices[i]` is the row of the source dataset that became
/// `test_features[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    train_features: Vec<Vec<f64>>,
    train_labels: Vec<usize>,
    test_features: Vec<Vec<f64>>,
    test_labels: Vec<usize>,
    test_indices: Vec<usize>,
}

impl Split {
    /// Training feature rows.
    #[must_use]
    pub fn train_features(&self) -> &[Vec<f64>] {
        &self.train_features
    }

    /// Training labels.
    #[must_use]
    pub fn train_labels(&self) -> &[usize] {
        &self.train_labels
    }

    /// Test feature rows.
    #[must_use]
    pub fn test_features(&self) -> &[Vec<f64>] {
        &self.test_features
    }

    /// Test labels.
    #[must_use]
    pub fn test_labels(&self) -> &[usize] {
        &self.test_labels
    }

    /// Source row index of each test row.
    #[must_use]
    pub fn test_indices(&self) -> &[usize] {
        &self.test_indices
    }
}

/// Shuffle row indices with ChaCha8 seeded by `seed` and take the first
/// `ceil(n * test_fraction)` as the test set.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::InvalidTestFraction`] | `test_fraction` is not in (0, 1) |
/// | [`DataError::TooFewSamples`] | Train or test set would be empty |
pub fn train_test_split(
    dataset: &Dataset,
    test_fraction: f64,
    seed: u64,
) -> Result<Split, DataError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DataError::InvalidTestFraction { test_fraction });
    }
    let n_samples = dataset.n_samples();
    let n_test = (n_samples as f64 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(DataError::TooFewSamples {
            n_samples,
            test_fraction,
        });
    }

    let mut order: Vec<usize> = (0..n_samples).collect();
    order.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
    let (test_indices, train_indices) = order.split_at(n_test);

    let rows = |indices: &[usize]| -> Vec<Vec<f64>> {
        indices.iter().map(|&i| dataset.features()[i].clone()).collect()
    };
    let labels = |indices: &[usize]| -> Vec<usize> {
        indices.iter().map(|&i| dataset.target()[i]).collect()
    };

    debug!(
        dataset = %dataset.name(),
        n_train = train_indices.len(),
        n_test,
        seed,
        "train/test split"
    );

    Ok(Split {
        train_features: rows(train_indices),
        train_labels: labels(train_indices),
        test_features: rows(test_indices),
        test_labels: labels(test_indices),
        test_indices: test_indices.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DatasetName;

    fn toy(n: usize) -> Dataset {
        Dataset::new(
            DatasetName::Iris,
            (0..n).map(|i| vec![i as f64]).collect(),
            (0..n).map(|i| i % 2).collect(),
            vec!["x".into()],
            vec!["even".into(), "odd".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_size_rounds_up() {
        let split = train_test_split(&toy(150), 0.33, 42).unwrap();
        assert_eq!(split.test_labels().len(), 50);
        assert_eq!(split.train_labels().len(), 100);
        let split = train_test_split(&toy(10), 0.33, 42).unwrap();
        assert_eq!(split.test_features().len(), 4);
    }

    #[test]
    fn partition_covers_every_row_once() {
        let split = train_test_split(&toy(30), 0.33, 7).unwrap();
        let mut seen: Vec<usize> = split
            .train_features()
            .iter()
            .chain(split.test_features())
            .map(|row| row[0] as usize)
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..30).collect::<Vec<_>>());
        for (row, &idx) in split.test_features().iter().zip(split.test_indices()) {
            assert_eq!(row[0] as usize, idx);
        }
    }

    #[test]
    fn same_seed_same_split() {
        let ds = toy(40);
        assert_eq!(
            train_test_split(&ds, 0.33, 42).unwrap(),
            train_test_split(&ds, 0.33, 42).unwrap()
        );
        assert_ne!(
            train_test_split(&ds, 0.33, 42).unwrap().test_indices(),
            train_test_split(&ds, 0.33, 43).unwrap().test_indices()
        );
    }

    #[test]
    fn invalid_fraction_and_tiny_datasets() {
        assert!(matches!(
            train_test_split(&toy(10), 1.0, 42),
            Err(DataError::InvalidTestFraction { .. })
        ));
        assert!(matches!(
            train_test_split(&toy(10), f64::NAN, 42),
            Err(DataError::InvalidTestFraction { .. })
        ));
        assert!(matches!(
            train_test_split(&toy(1), 0.33, 42),
            Err(DataError::TooFewSamples { n_samples: 1, .. })
        ));
    }
}
