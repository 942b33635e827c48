//! Tree-based classifiers: train and predict.
//!
//! Provides a hand-rolled CART decision tree with Gini/Entropy split
//! criteria, and two ensembles built on it: a bootstrapped Random Forest
//! and an Extremely Randomized Trees forest. Ensemble trees are trained in
//! parallel via rayon from deterministic per-tree seeds.

mod config;
mod error;
mod forest;
mod node;
mod predict;
mod split;
mod tree;
mod validate;

pub use config::{BootstrapMode, MaxFeatures, RandomForestConfig};
pub use error::RfError;
pub use forest::RandomForest;
pub use node::{FeatureIndex, Impurity, Node, NodeIndex};
pub use predict::ClassDistribution;
pub use split::{SplitCriterion, SplitMethod};
pub use tree::{DecisionTree, DecisionTreeConfig};
