//! Model kinds, hyperparameters and the estimator factory.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use treelens_rf::{DecisionTree, DecisionTreeConfig, RandomForest, RandomForestConfig, RfError};

use crate::DashboardError;

/// Allowed `n_estimators` values.
pub const N_ESTIMATORS_RANGE: RangeInclusive<usize> = 1..=100;
/// Allowed `max_depth` values.
pub const MAX_DEPTH_RANGE: RangeInclusive<usize> = 1..=150;

/// Ensemble size and tree depth chosen in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Hyperparameters {
    n_estimators: usize,
    max_depth: usize,
}

impl Hyperparameters {
    /// Validate both values against their ranges.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::InvalidHyperparameter`] for the first value
    /// outside [`N_ESTIMATORS_RANGE`] or [`MAX_DEPTH_RANGE`].
    pub fn new(n_estimators: usize, max_depth: usize) -> Result<Self, DashboardError> {
        check_range("n_estimators", n_estimators, &N_ESTIMATORS_RANGE)?;
        check_range("max_depth", max_depth, &MAX_DEPTH_RANGE)?;
        Ok(Self {
            n_estimators,
            max_depth,
        })
    }

    /// Number of trees in the ensembles.
    #[must_use]
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    /// Depth limit of every tree.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            n_estimators: 25,
            max_depth: 10,
        }
    }
}

fn check_range(
    name: &'static str,
    value: usize,
    range: &RangeInclusive<usize>,
) -> Result<(), DashboardError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(DashboardError::InvalidHyperparameter {
            name,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

/// Family of tree classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// A single CART tree.
    DecisionTree,
    /// Bootstrapped trees with exact splits on random feature subsets.
    RandomForest,
    /// Extremely randomized trees on the full training set.
    ExtraTrees,
}

impl ModelKind {
    /// All kinds in selector order.
    pub const ALL: [ModelKind; 3] = [
        ModelKind::DecisionTree,
        ModelKind::RandomForest,
        ModelKind::ExtraTrees,
    ];

    /// Name shown in the model selector and page title.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::DecisionTree => "DecisionTreeClassifier",
            ModelKind::RandomForest => "RandomForestClassifier",
            ModelKind::ExtraTrees => "ExtraTreesClassifier",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ModelKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ModelKind::ALL
            .into_iter()
            .find(|kind| {
                kind.display_name().eq_ignore_ascii_case(s)
                    || format!("{kind:?}").eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| DashboardError::InvalidSelection {
                field: "model",
                value: s.to_string(),
            })
    }
}

/// An unfitted estimator.
#[derive(Debug, Clone, PartialEq)]
pub enum Estimator {
    /// Single tree, all features considered at every split.
    DecisionTree(DecisionTreeConfig),
    /// Random forest: bootstrap, `sqrt(n_features)` features per split.
    RandomForest(RandomForestConfig),
    /// Extra-trees: no bootstrap, random thresholds, `sqrt(n_features)`
    /// features per split.
    ExtraTrees(RandomForestConfig),
}

impl Estimator {
    /// Which family this estimator belongs to.
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        match self {
            Estimator::DecisionTree(_) => ModelKind::DecisionTree,
            Estimator::RandomForest(_) => ModelKind::RandomForest,
            Estimator::ExtraTrees(_) => ModelKind::ExtraTrees,
        }
    }

    /// Fit on a training set whose labels are below `n_classes`.
    ///
    /// Probability vectors of the fitted model always have `n_classes`
    /// entries.
    ///
    /// # Errors
    ///
    /// Any [`RfError`] from validating the data or the configuration.
    pub fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        n_classes: usize,
    ) -> Result<FittedModel, RfError> {
        match self {
            Estimator::DecisionTree(config) => config
                .fit_with_classes(features, labels, n_classes)
                .map(FittedModel::Tree),
            Estimator::RandomForest(config) | Estimator::ExtraTrees(config) => config
                .clone()
                .with_n_classes(n_classes)
                .fit(features, labels)
                .map(FittedModel::Forest),
        }
    }
}

/// Builds unfitted estimators from the current hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelFactory {
    seed: u64,
}

impl ModelFactory {
    /// Create a factory whose estimators all use `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Return the seed passed to every estimator.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// One estimator per [`ModelKind`], in [`ModelKind::ALL`] order.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Training`] if an ensemble rejects its size.
    pub fn estimators(&self, params: Hyperparameters) -> Result<Vec<Estimator>, DashboardError> {
        ModelKind::ALL
            .into_iter()
            .map(|kind| self.estimator(kind, params))
            .collect()
    }

    /// The estimator of one kind.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Training`] if an ensemble rejects its size.
    pub fn estimator(&self, kind: ModelKind, params: Hyperparameters) -> Result<Estimator, DashboardError> {
        let max_depth = Some(params.max_depth());
        let ensemble_error = |source| DashboardError::Training { model: kind, source };
        Ok(match kind {
            ModelKind::DecisionTree => Estimator::DecisionTree(
                DecisionTreeConfig::new()
                    .with_max_depth(max_depth)
                    .with_seed(self.seed),
            ),
            ModelKind::RandomForest => Estimator::RandomForest(
                RandomForestConfig::new(params.n_estimators())
                    .map_err(ensemble_error)?
                    .with_max_depth(max_depth)
                    .with_seed(self.seed),
            ),
            ModelKind::ExtraTrees => Estimator::ExtraTrees(
                RandomForestConfig::extra_trees(params.n_estimators())
                    .map_err(ensemble_error)?
                    .with_max_depth(max_depth)
                    .with_seed(self.seed),
            ),
        })
    }
}

/// A trained model of any kind.
#[derive(Debug, Clone)]
pub enum FittedModel {
    /// A fitted decision tree.
    Tree(DecisionTree),
    /// A fitted ensemble.
    Forest(RandomForest),
}

/// Size of a fitted model, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    /// Number of trees.
    pub n_trees: usize,
    /// Total node count over all trees.
    pub n_nodes: usize,
    /// Deepest leaf over all trees.
    pub depth: usize,
}

impl FittedModel {
    /// Predict a class index per row.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] for rows of the wrong width.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        match self {
            FittedModel::Tree(tree) => features.iter().map(|row| tree.predict(row)).collect(),
            FittedModel::Forest(forest) => forest.predict_batch(features),
        }
    }

    /// Predict a class probability vector per row.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] for rows of the wrong width.
    pub fn predict_proba_batch(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, RfError> {
        match self {
            FittedModel::Tree(tree) => features
                .iter()
                .map(|row| tree.predict_proba(row).map(<[f64]>::to_vec))
                .collect(),
            FittedModel::Forest(forest) => Ok(forest
                .predict_proba_batch(features)?
                .into_iter()
                .map(|dist| dist.into_vec())
                .collect()),
        }
    }

    /// Number of classes the model predicts over.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        match self {
            FittedModel::Tree(tree) => tree.n_classes(),
            FittedModel::Forest(forest) => forest.n_classes(),
        }
    }

    /// Tree count, node count and depth.
    #[must_use]
    pub fn summary(&self) -> ModelSummary {
        let trees: &[DecisionTree] = match self {
            FittedModel::Tree(tree) => std::slice::from_ref(tree),
            FittedModel::Forest(forest) => forest.trees(),
        };
        ModelSummary {
            n_trees: trees.len(),
            n_nodes: trees.iter().map(DecisionTree::n_nodes).sum(),
            depth: trees.iter().map(DecisionTree::depth).max().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use treelens_rf::{BootstrapMode, MaxFeatures, SplitMethod};

    use super::*;

    fn params(n_estimators: usize, max_depth: usize) -> Hyperparameters {
        Hyperparameters::new(n_estimators, max_depth).unwrap()
    }

    #[test]
    fn hyperparameter_bounds() {
        assert!(Hyperparameters::new(1, 1).is_ok());
        assert!(Hyperparameters::new(100, 150).is_ok());
        assert!(matches!(
            Hyperparameters::new(0, 10),
            Err(DashboardError::InvalidHyperparameter { name: "n_estimators", .. })
        ));
        assert!(matches!(
            Hyperparameters::new(25, 151),
            Err(DashboardError::InvalidHyperparameter { name: "max_depth", max: 150, .. })
        ));
        assert_eq!(Hyperparameters::default(), params(25, 10));
    }

    #[test]
    fn model_kind_names() {
        let names: Vec<&str> = ModelKind::ALL.iter().map(|k| k.display_name()).collect();
        assert_eq!(
            names,
            ["DecisionTreeClassifier", "RandomForestClassifier", "ExtraTreesClassifier"]
        );
        assert_eq!("ExtraTreesClassifier".parse::<ModelKind>().unwrap(), ModelKind::ExtraTrees);
        assert_eq!("randomforest".parse::<ModelKind>().unwrap(), ModelKind::RandomForest);
        assert!("SVC".parse::<ModelKind>().is_err());
    }

    #[test]
    fn factory_order_and_settings() {
        let estimators = ModelFactory::new(42).estimators(params(7, 3)).unwrap();
        let kinds: Vec<ModelKind> = estimators.iter().map(Estimator::kind).collect();
        assert_eq!(kinds, ModelKind::ALL);

        let Estimator::DecisionTree(tree) = &estimators[0] else {
            panic!("expected a decision tree");
        };
        assert_eq!(tree.max_depth(), Some(3));
        assert_eq!(tree.max_features(), None);

        let Estimator::RandomForest(rf) = &estimators[1] else {
            panic!("expected a random forest");
        };
        assert_eq!(rf.n_trees(), 7);
        assert_eq!(rf.max_depth(), Some(3));
        assert_eq!(rf.bootstrap(), BootstrapMode::Enabled);
        assert_eq!(rf.max_features(), MaxFeatures::Sqrt);

        let Estimator::ExtraTrees(et) = &estimators[2] else {
            panic!("expected extra trees");
        };
        assert_eq!(et.split_method(), SplitMethod::ExtraTrees);
        assert_eq!(et.bootstrap(), BootstrapMode::Disabled);
    }

    #[test]
    fn fitted_models_predict_over_all_classes() {
        let features: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let labels: Vec<usize> = (0..40).map(|i| usize::from(i >= 20)).collect();

        for estimator in ModelFactory::new(1).estimators(params(5, 4)).unwrap() {
            let model = estimator.fit(&features, &labels, 3).unwrap();
            assert_eq!(model.n_classes(), 3);
            let proba = model.predict_proba_batch(&features).unwrap();
            assert!(proba.iter().all(|p| p.len() == 3));
            let predictions = model.predict_batch(&features).unwrap();
            assert_eq!(predictions.len(), 40);
            assert!(model.summary().depth <= 4);
        }
    }
}
