//! Prediction methods for the ensemble.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::RfError;
use crate::forest::RandomForest;

/// Class probability distribution from a prediction, length `n_classes`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution {
    probs: Vec<f64>,
}

impl ClassDistribution {
    pub(crate) fn new(probs: Vec<f64>) -> Self {
        Self { probs }
    }

    /// Return the predicted class; the lowest index wins ties.
    #[must_use]
    pub fn predicted_class(&self) -> usize {
        self.probs
            .iter()
            .enumerate()
            .fold(None::<(usize, f64)>, |best, (idx, &p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((idx, p)),
            })
            .map_or(0, |(idx, _)| idx)
    }

    /// Probability assigned to `class`, or 0.0 when out of range.
    #[must_use]
    pub fn probability(&self, class: usize) -> f64 {
        self.probs.get(class).copied().unwrap_or(0.0)
    }

    /// Return the probability distribution as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }

    /// Consume the distribution and return the raw vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.probs
    }
}

impl RandomForest {
    /// Predict the class label for a single sample.
    ///
    /// Returns the argmax of the averaged probability distribution.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        Ok(self.predict_proba(sample)?.predicted_class())
    }

    /// Return the class probability distribution for a single sample,
    /// averaged over the leaf distributions of all trees.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<ClassDistribution, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }

        let mut avg = vec![0.0f64; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in avg.iter_mut().zip(tree.predict_proba(sample)?) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        avg.iter_mut().for_each(|v| *v /= n);

        Ok(ClassDistribution::new(avg))
    }

    /// Predict class labels for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any sample has the wrong feature count.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        features
            .into_par_iter()
            .map(|sample| self.predict(sample))
            .collect()
    }

    /// Return probability distributions for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any sample has the wrong feature count.
    pub fn predict_proba_batch(
        &self,
        features: &[Vec<f64>],
    ) -> Result<Vec<ClassDistribution>, RfError> {
        features
            .into_par_iter()
            .map(|sample| self.predict_proba(sample))
            .collect()
    }

    /// Return the number of features this forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Borrow the fitted trees.
    #[must_use]
    pub fn trees(&self) -> &[crate::DecisionTree] {
        &self.trees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RandomForestConfig;

    #[test]
    fn argmax_prefers_lowest_index_on_ties() {
        assert_eq!(ClassDistribution::new(vec![0.4, 0.4, 0.2]).predicted_class(), 0);
        assert_eq!(ClassDistribution::new(vec![0.1, 0.3, 0.6]).predicted_class(), 2);
        assert_eq!(ClassDistribution::new(Vec::new()).predicted_class(), 0);
    }

    #[test]
    fn probability_out_of_range_is_zero() {
        let dist = ClassDistribution::new(vec![0.25, 0.75]);
        assert!((dist.probability(1) - 0.75).abs() < f64::EPSILON);
        assert_eq!(dist.probability(9), 0.0);
    }

    #[test]
    fn batch_matches_individual() {
        let features: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64, (i % 4) as f64]).collect();
        let labels: Vec<usize> = (0..30).map(|i| usize::from(i >= 15)).collect();
        let forest = RandomForestConfig::new(8)
            .unwrap()
            .fit(&features, &labels)
            .unwrap();

        let batch = forest.predict_proba_batch(&features).unwrap();
        for (sample, dist) in features.iter().zip(&batch) {
            let single = forest.predict_proba(sample).unwrap();
            assert_eq!(dist, &single);
            let sum: f64 = single.as_slice().iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
        assert!(matches!(
            forest.predict(&[1.0]),
            Err(RfError::PredictionFeatureMismatch { expected: 2, got: 1 })
        ));
    }
}
