use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::{
    RfError,
    node::{Impurity, Node, NodeIndex},
    split::{SplitCriterion, SplitMethod, find_split},
    validate::validate_training_data,
};

/// Configuration for a single CART decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `criterion`         | `Gini`                |
/// | `split_method`      | `Exact`               |
/// | `max_depth`         | `None` (unlimited)    |
/// | `min_samples_split` | 2                     |
/// | `min_samples_leaf`  | 1                     |
/// | `max_features`      | `None` (all features) |
/// | `seed`              | 42                    |
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) split_method: SplitMethod,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            split_method: SplitMethod::Exact,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the split-finding strategy.
    #[must_use]
    pub fn with_split_method(mut self, split_method: SplitMethod) -> Self {
        self.split_method = split_method;
        self
    }

    /// Set the maximum tree depth.
    ///
    /// `None` grows until leaves are pure or too small to split. `Some(d)`
    /// limits depth to `d` levels below the root (root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of samples required in each leaf after a split.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set the maximum number of non-constant features examined per split.
    ///
    /// `None` means consider all features.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the split criterion.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Return the split-finding strategy.
    #[must_use]
    pub fn split_method(&self) -> SplitMethod {
        self.split_method
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the maximum features to consider per split, if set.
    #[must_use]
    pub fn max_features(&self) -> Option<usize> {
        self.max_features
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a decision tree, inferring the class count as `max(label) + 1`.
    ///
    /// `features[sample_idx][feature_idx]` is row-major; `labels` are
    /// zero-based class indices.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                            |
    /// |--------------------------------------|-------------------------------------------------|
    /// | [`RfError::EmptyDataset`]            | `features` is empty                             |
    /// | [`RfError::ZeroFeatures`]            | rows have zero feature columns                  |
    /// | [`RfError::LabelCountMismatch`]      | `labels.len() != features.len()`                |
    /// | [`RfError::FeatureCountMismatch`]    | rows have inconsistent lengths                  |
    /// | [`RfError::NonFiniteValue`]          | any value is NaN or infinite                    |
    /// | [`RfError::InvalidMaxFeatures`]      | `max_features` resolves outside [1, n_features] |
    /// | [`RfError::InvalidMaxDepth`]         | `max_depth` is `Some(0)`                        |
    /// | [`RfError::InvalidMinSamplesSplit`]  | `min_samples_split` < 2                         |
    /// | [`RfError::InvalidMinSamplesLeaf`]   | `min_samples_leaf` < 1                          |
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<DecisionTree, RfError> {
        self.fit_inner(features, labels, None)
    }

    /// Train a decision tree over a fixed number of classes.
    ///
    /// Probability vectors of the fitted tree have length `n_classes` even
    /// when some classes are absent from `labels`.
    ///
    /// # Errors
    ///
    /// Same as [`DecisionTreeConfig::fit`], plus [`RfError::LabelOutOfRange`]
    /// when a label is not below `n_classes`.
    pub fn fit_with_classes(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        n_classes: usize,
    ) -> Result<DecisionTree, RfError> {
        self.fit_inner(features, labels, Some(n_classes))
    }

    #[instrument(skip(self, features, labels), fields(n_samples = features.len()))]
    fn fit_inner(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        n_classes: Option<usize>,
    ) -> Result<DecisionTree, RfError> {
        let shape = validate_training_data(features, labels, n_classes)?;
        self.validate(shape.n_features)?;

        let columns = to_columns(features, shape.n_features);
        let sample_indices: Vec<usize> = (0..shape.n_samples).collect();
        Ok(self.grow(&columns, labels, &sample_indices, shape.n_classes))
    }

    /// Check the config against the dataset width.
    pub(crate) fn validate(&self, n_features: usize) -> Result<(), RfError> {
        if let Some(d) = self.max_depth
            && d == 0
        {
            return Err(RfError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(RfError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(RfError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }
        let max_features = self.max_features.unwrap_or(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }
        Ok(())
    }

    /// Grow a tree over `sample_indices` of pre-validated column-major data.
    ///
    /// Indices may repeat (bootstrap samples); a repeated index counts once
    /// per occurrence.
    pub(crate) fn grow(
        &self,
        columns: &[Vec<f64>],
        labels: &[usize],
        sample_indices: &[usize],
        n_classes: usize,
    ) -> DecisionTree {
        let n_features = columns.len();
        let mut builder = TreeBuilder {
            columns,
            labels,
            n_classes,
            config: self,
            max_features: self.max_features.unwrap_or(n_features),
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            arena: Vec::new(),
        };
        let root = builder.build(sample_indices, 0);
        debug!(
            root_index = root.index(),
            n_nodes = builder.arena.len(),
            n_samples = sample_indices.len(),
            "decision tree built"
        );

        DecisionTree {
            nodes: builder.arena,
            n_features,
            n_classes,
        }
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert row-major features to column-major layout.
pub(crate) fn to_columns(features: &[Vec<f64>], n_features: usize) -> Vec<Vec<f64>> {
    (0..n_features)
        .map(|feat_idx| features.iter().map(|row| row[feat_idx]).collect())
        .collect()
}

struct TreeBuilder<'a> {
    columns: &'a [Vec<f64>],
    labels: &'a [usize],
    n_classes: usize,
    config: &'a DecisionTreeConfig,
    max_features: usize,
    rng: ChaCha8Rng,
    arena: Vec<Node>,
}

impl TreeBuilder<'_> {
    /// Recursively build the subtree for `sample_indices` and return its index.
    fn build(&mut self, sample_indices: &[usize], depth: usize) -> NodeIndex {
        let n_samples = sample_indices.len();
        let mut class_counts = vec![0usize; self.n_classes];
        for &si in sample_indices {
            class_counts[self.labels[si]] += 1;
        }
        let impurity = self.config.criterion.impurity(&class_counts, n_samples);

        let depth_exceeded = self.config.max_depth.is_some_and(|max_d| depth >= max_d);
        let too_few = n_samples < self.config.min_samples_split;
        let pure = impurity.value() <= 0.0;
        if too_few || pure || depth_exceeded {
            return self.push_leaf(&class_counts, impurity, n_samples);
        }

        let split = find_split(
            self.columns,
            self.labels,
            sample_indices,
            self.n_classes,
            self.config.criterion,
            self.config.split_method,
            self.max_features,
            self.config.min_samples_leaf,
            &mut self.rng,
        );
        let Some(split) = split else {
            return self.push_leaf(&class_counts, impurity, n_samples);
        };

        // Reserve the parent slot so children get higher indices.
        let node_idx = self.arena.len();
        self.arena.push(Node::Leaf {
            prediction: 0,
            distribution: Vec::new(),
            impurity,
            n_samples,
        });
        let left = self.build(&split.left_indices, depth + 1);
        let right = self.build(&split.right_indices, depth + 1);

        self.arena[node_idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            impurity,
            n_samples,
        };
        NodeIndex::new(node_idx)
    }

    fn push_leaf(&mut self, class_counts: &[usize], impurity: Impurity, n_samples: usize) -> NodeIndex {
        let total = n_samples.max(1) as f64;
        let distribution: Vec<f64> = class_counts.iter().map(|&c| c as f64 / total).collect();
        // First class wins ties, matching argmax over the distribution.
        let prediction = class_counts
            .iter()
            .enumerate()
            .fold((0usize, 0usize), |best, (idx, &count)| {
                if count > best.1 { (idx, count) } else { best }
            })
            .0;
        let idx = self.arena.len();
        self.arena.push(Node::Leaf {
            prediction,
            distribution,
            impurity,
            n_samples,
        });
        NodeIndex::new(idx)
    }
}

/// A fitted CART decision tree.
///
/// Stored as an arena `Vec<Node>` with index references.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl DecisionTree {
    /// Predict the class label for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        self.check_width(sample)?;
        match &self.nodes[self.traverse(sample)] {
            Node::Leaf { prediction, .. } => Ok(*prediction),
            Node::Split { .. } => unreachable!("traverse always ends at a leaf"),
        }
    }

    /// Return the class probability distribution for a single sample.
    ///
    /// The returned slice has length `n_classes` and sums to 1.0.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<&[f64], RfError> {
        self.check_width(sample)?;
        match &self.nodes[self.traverse(sample)] {
            Node::Leaf { distribution, .. } => Ok(distribution),
            Node::Split { .. } => unreachable!("traverse always ends at a leaf"),
        }
    }

    /// Borrow the node arena (root at index 0).
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the number of features this tree was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree; a lone root leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((node_idx, d)) = stack.pop() {
            match &self.nodes[node_idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    stack.push((left.index(), d + 1));
                    stack.push((right.index(), d + 1));
                }
            }
        }
        max_depth
    }

    fn check_width(&self, sample: &[f64]) -> Result<(), RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(())
    }

    /// Walk from the root to a leaf and return the leaf's arena index.
    fn traverse(&self, sample: &[f64]) -> usize {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { .. } => return idx,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if sample[feature.index()] <= *threshold {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }
}
