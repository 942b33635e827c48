//! Cached dataset loading.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument};

use crate::cache::{CacheStatus, MemoCache};
use crate::fetch::load_dataset;
use crate::split::{Split, train_test_split};
use crate::{DataError, DatasetName};

/// Default fraction of rows held out for testing.
pub const DEFAULT_TEST_FRACTION: f64 = 0.33;

/// Default seed of the train/test shuffle.
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// A dataset after splitting: everything the pipeline needs from it.
///
/// The full source matrix is not retained; only its split halves are.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    name: DatasetName,
    split: Split,
    feature_names: Vec<String>,
    class_names: Vec<String>,
}

impl LoadedDataset {
    /// Return the dataset name.
    #[must_use]
    pub fn name(&self) -> DatasetName {
        self.name
    }

    /// Train/test partition.
    #[must_use]
    pub fn split(&self) -> &Split {
        &self.split
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

    /// Number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.class_names.len()
    }
}

/// Loads datasets by name, splits them, and memoizes the result per name.
///
/// # Defaults
///
/// | Parameter       | Default |
/// |-----------------|---------|
/// | `test_fraction` | 0.33    |
/// | `seed`          | 42      |
#[derive(Debug)]
pub struct DatasetProvider {
    data_home: PathBuf,
    test_fraction: f64,
    seed: u64,
    cache: MemoCache<DatasetName, Arc<LoadedDataset>>,
}

impl DatasetProvider {
    /// Create a provider that stores downloaded sources under `data_home`.
    #[must_use]
    pub fn new(data_home: impl Into<PathBuf>) -> Self {
        Self {
            data_home: data_home.into(),
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SPLIT_SEED,
            cache: MemoCache::new("datasets"),
        }
    }

    /// Set the held-out fraction.
    #[must_use]
    pub fn with_test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    /// Set the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Directory holding downloaded sources.
    #[must_use]
    pub fn data_home(&self) -> &Path {
        &self.data_home
    }

    /// Return the split seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the test fraction.
    #[must_use]
    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    /// The underlying cache, for hit and miss counts.
    #[must_use]
    pub fn cache(&self) -> &MemoCache<DatasetName, Arc<LoadedDataset>> {
        &self.cache
    }

    /// Load, split and cache `name`. Later calls return the same `Arc`.
    ///
    /// # Errors
    ///
    /// Any [`DataError`] from downloading, parsing or splitting. Failures are
    /// not cached, so a later call retries.
    #[instrument(skip(self))]
    pub fn load(&self, name: DatasetName) -> Result<Arc<LoadedDataset>, DataError> {
        self.load_with_status(name).map(|(loaded, _)| loaded)
    }

    /// Like [`DatasetProvider::load`], also reporting whether the cache was hit.
    ///
    /// # Errors
    ///
    /// Same as [`DatasetProvider::load`].
    pub fn load_with_status(
        &self,
        name: DatasetName,
    ) -> Result<(Arc<LoadedDataset>, CacheStatus), DataError> {
        self.cache.get_or_try_insert_with(&name, || {
            let start = Instant::now();
            let dataset = load_dataset(name, &self.data_home)?;
            let split = train_test_split(&dataset, self.test_fraction, self.seed)?;
            info!(
                dataset = %name,
                n_train = split.train_labels().len(),
                n_test = split.test_labels().len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "dataset ready"
            );
            Ok(Arc::new(LoadedDataset {
                name,
                split,
                feature_names: dataset.feature_names().to_vec(),
                class_names: dataset.class_names().to_vec(),
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn iris_is_cached_by_name() {
        let dir = TempDir::new().unwrap();
        let provider = DatasetProvider::new(dir.path());

        let (first, status) = provider.load_with_status(DatasetName::Iris).unwrap();
        assert_eq!(status, CacheStatus::Miss);
        let (second, status) = provider.load_with_status(DatasetName::Iris).unwrap();
        assert_eq!(status, CacheStatus::Hit);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.split().test_labels().len(), 50);
        assert_eq!(first.split().train_labels().len(), 100);
    }

    #[test]
    fn failed_load_is_retried() {
        let dir = TempDir::new().unwrap();
        // A directory where the cached file should be makes reading fail.
        std::fs::create_dir(dir.path().join("wine.data")).unwrap();
        let provider = DatasetProvider::new(dir.path());
        assert!(provider.load(DatasetName::Wine).is_err());
        assert!(provider.load(DatasetName::Wine).is_err());
        assert_eq!(provider.cache().misses(), 2);
        assert!(provider.cache().is_empty());
    }
}
