//! Cached model training.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, info_span};
use treelens_data::{CacheStatus, DatasetName, LoadedDataset, MemoCache};

use crate::DashboardError;
use crate::model::{FittedModel, Hyperparameters, ModelFactory, ModelKind};

/// Everything a fitted model depends on.
///
/// `n_estimators` is part of the key even for a decision tree, which does
/// not use it, so moving the slider refits the tree too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TrainKey {
    /// Dataset the model is trained on.
    pub dataset: DatasetName,
    /// Model family.
    pub model: ModelKind,
    /// Ensemble size.
    pub n_estimators: usize,
    /// Depth limit.
    pub max_depth: usize,
}

/// Result of [`Trainer::train`].
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    /// The fitted model, shared with the cache.
    pub model: Arc<FittedModel>,
    /// Whether the fit came from the cache.
    pub cache: CacheStatus,
    /// Time spent in this call.
    pub elapsed: Duration,
}

/// Fits models and memoizes them by [`TrainKey`].
#[derive(Debug)]
pub struct Trainer {
    factory: ModelFactory,
    cache: MemoCache<TrainKey, Arc<FittedModel>>,
}

impl Trainer {
    /// Create a trainer with an empty cache.
    #[must_use]
    pub fn new(factory: ModelFactory) -> Self {
        Self {
            factory,
            cache: MemoCache::new("models"),
        }
    }

    /// Return the estimator factory.
    #[must_use]
    pub fn factory(&self) -> &ModelFactory {
        &self.factory
    }

    /// The underlying cache, for hit and miss counts.
    #[must_use]
    pub fn cache(&self) -> &MemoCache<TrainKey, Arc<FittedModel>> {
        &self.cache
    }

    /// Fit `kind` on the training half of `data`, or reuse a cached fit.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Training`] if the estimator cannot be built
    /// or rejects the data. Failed fits are not cached.
    pub fn train(
        &self,
        data: &LoadedDataset,
        kind: ModelKind,
        params: Hyperparameters,
    ) -> Result<TrainOutcome, DashboardError> {
        let key = TrainKey {
            dataset: data.name(),
            model: kind,
            n_estimators: params.n_estimators(),
            max_depth: params.max_depth(),
        };
        let span = info_span!("train", dataset = %key.dataset, model = %kind);
        let _guard = span.enter();

        let start = Instant::now();
        let (model, cache) = self.cache.get_or_try_insert_with(&key, || {
            info!("Building a {kind} model for {} ...", data.name());
            let estimator = self.factory.estimator(kind, params)?;
            let split = data.split();
            estimator
                .fit(split.train_features(), split.train_labels(), data.n_classes())
                .map(Arc::new)
                .map_err(|source| DashboardError::Training { model: kind, source })
        })?;
        let elapsed = start.elapsed();

        if !cache.is_hit() {
            let summary = model.summary();
            info!(
                n_trees = summary.n_trees,
                n_nodes = summary.n_nodes,
                depth = summary.depth,
                elapsed_ms = elapsed.as_millis() as u64,
                "model trained"
            );
        }
        Ok(TrainOutcome {
            model,
            cache,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use treelens_data::DatasetProvider;

    use super::*;

    fn iris() -> Arc<LoadedDataset> {
        let dir = tempfile::tempdir().unwrap();
        DatasetProvider::new(dir.path()).load(DatasetName::Iris).unwrap()
    }

    #[test]
    fn second_fit_is_cached() {
        let data = iris();
        let trainer = Trainer::new(ModelFactory::new(42));
        let params = Hyperparameters::new(5, 4).unwrap();

        let first = trainer.train(&data, ModelKind::RandomForest, params).unwrap();
        let second = trainer.train(&data, ModelKind::RandomForest, params).unwrap();

        assert_eq!(first.cache, CacheStatus::Miss);
        assert_eq!(second.cache, CacheStatus::Hit);
        assert!(Arc::ptr_eq(&first.model, &second.model));
        assert_eq!(trainer.cache().len(), 1);
    }

    #[test]
    fn each_hyperparameter_change_refits() {
        let data = iris();
        let trainer = Trainer::new(ModelFactory::new(42));

        for (n, depth) in [(5, 4), (6, 4), (5, 5)] {
            let params = Hyperparameters::new(n, depth).unwrap();
            let outcome = trainer.train(&data, ModelKind::DecisionTree, params).unwrap();
            assert_eq!(outcome.cache, CacheStatus::Miss);
        }
        assert_eq!(trainer.cache().len(), 3);
        assert_eq!(trainer.cache().hits(), 0);
    }

    #[test]
    fn probability_width_matches_dataset() {
        let data = iris();
        let trainer = Trainer::new(ModelFactory::new(7));
        let params = Hyperparameters::default();
        for kind in ModelKind::ALL {
            let outcome = trainer.train(&data, kind, params).unwrap();
            let proba = outcome
                .model
                .predict_proba_batch(data.split().test_features())
                .unwrap();
            assert!(proba.iter().all(|row| row.len() == 3));
        }
    }
}
