//! Classification datasets for treelens: loading, splitting and caching.
//!
//! Iris is bundled; Wine and Covertype are downloaded from the UCI
//! repository into a data home on first use. Every dataset is split once
//! into a deterministic train/test partition and memoized by name.

mod cache;
mod dataset;
mod error;
mod fetch;
mod name;
mod provider;
mod reader;
mod split;

pub use cache::{CacheStatus, MemoCache};
pub use dataset::Dataset;
pub use error::DataError;
pub use fetch::{ensure_source, load_dataset};
pub use name::DatasetName;
pub use provider::{DEFAULT_SPLIT_SEED, DEFAULT_TEST_FRACTION, DatasetProvider, LoadedDataset};
pub use split::{Split, train_test_split};
