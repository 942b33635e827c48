//! Ensemble training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::{BootstrapMode, MaxFeatures, RandomForestConfig};
use crate::error::RfError;
use crate::tree::{DecisionTree, DecisionTreeConfig, to_columns};
use crate::validate::validate_training_data;

/// A fitted ensemble of decision trees.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

/// Resolve `MaxFeatures` to a concrete count.
pub(crate) fn resolve_max_features(
    max_features: MaxFeatures,
    n_features: usize,
) -> Result<usize, RfError> {
    let resolved = match max_features {
        MaxFeatures::Sqrt => (n_features as f64).sqrt().floor().max(1.0) as usize,
        MaxFeatures::Log2 => (n_features as f64).log2().floor().max(1.0) as usize,
        MaxFeatures::Fraction(f) => (n_features as f64 * f).ceil() as usize,
        MaxFeatures::Fixed(n) => n,
        MaxFeatures::All => n_features,
    };
    if resolved == 0 || resolved > n_features {
        return Err(RfError::InvalidMaxFeatures {
            max_features: resolved,
            n_features,
        });
    }
    Ok(resolved)
}

/// Draw `n_samples` indices with replacement.
fn bootstrap_sample(n_samples: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
}

/// Train the ensemble.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<RandomForest, RfError> {
    let shape = validate_training_data(features, labels, config.n_classes)?;
    let max_features = resolve_max_features(config.max_features, shape.n_features)?;

    let tree_config = DecisionTreeConfig::new()
        .with_criterion(config.criterion)
        .with_split_method(config.split_method)
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split)
        .with_min_samples_leaf(config.min_samples_leaf)
        .with_max_features(Some(max_features));
    tree_config.validate(shape.n_features)?;

    info!(
        n_trees = config.n_trees,
        n_samples = shape.n_samples,
        n_features = shape.n_features,
        n_classes = shape.n_classes,
        max_features,
        split_method = ?config.split_method,
        bootstrap = ?config.bootstrap,
        "training forest"
    );

    let columns = to_columns(features, shape.n_features);
    let all_indices: Vec<usize> = (0..shape.n_samples).collect();

    // Per-tree seeds come from one master stream so results do not depend on
    // the rayon schedule.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    let trees: Vec<DecisionTree> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let sample_indices = match config.bootstrap {
                BootstrapMode::Enabled => bootstrap_sample(shape.n_samples, &mut rng),
                BootstrapMode::Disabled => all_indices.clone(),
            };
            tree_config
                .clone()
                .with_seed(rng.r#gen())
                .grow(&columns, labels, &sample_indices, shape.n_classes)
        })
        .collect();

    debug!(n_trees_trained = trees.len(), "forest training complete");

    Ok(RandomForest {
        trees,
        n_features: shape.n_features,
        n_classes: shape.n_classes,
    })
}
