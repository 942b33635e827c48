//! Accuracy regression tests for treelens-rf.
//!
//! These tests verify that algorithmic changes do not degrade held-out
//! accuracy of the three classifiers on a deterministic synthetic dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use treelens_rf::{DecisionTreeConfig, RandomForestConfig};

// ---------------------------------------------------------------------------
// Helper: deterministic synthetic classification dataset
// ---------------------------------------------------------------------------

/// Generate a `n_samples` x 10 dataset with 3 classes.
///
/// Features 0-2 are informative (class * 3.0 + noise in [0, 0.5]).
/// Features 3-9 are pure noise in [0, 0.5].
/// Samples are assigned round-robin across classes.
fn make_classification(n_samples: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n_features = 10;
    let n_classes = 3;

    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let class = i % n_classes;
        labels.push(class);
        let row: Vec<f64> = (0..n_features)
            .map(|f| {
                let base = if f < 3 { class as f64 * 3.0 } else { 0.0 };
                base + rng.r#gen::<f64>() * 0.5
            })
            .collect();
        features.push(row);
    }
    (features, labels)
}

fn accuracy(predictions: &[usize], labels: &[usize]) -> f64 {
    let correct = predictions
        .iter()
        .zip(labels)
        .filter(|&(&p, &l)| p == l)
        .count();
    correct as f64 / labels.len() as f64
}

// ---------------------------------------------------------------------------
// a) held-out accuracy per model
// ---------------------------------------------------------------------------

#[test]
fn decision_tree_holdout_accuracy() {
    let (train_x, train_y) = make_classification(300, 42);
    let (test_x, test_y) = make_classification(90, 7);
    let tree = DecisionTreeConfig::new()
        .with_max_depth(Some(10))
        .fit(&train_x, &train_y)
        .unwrap();

    let predictions: Vec<usize> = test_x.iter().map(|x| tree.predict(x).unwrap()).collect();
    let acc = accuracy(&predictions, &test_y);
    assert!(acc > 0.9, "decision tree holdout accuracy {acc} <= 0.9");
}

#[test]
fn random_forest_holdout_accuracy() {
    let (train_x, train_y) = make_classification(300, 42);
    let (test_x, test_y) = make_classification(90, 7);
    let forest = RandomForestConfig::new(25)
        .unwrap()
        .with_max_depth(Some(10))
        .fit(&train_x, &train_y)
        .unwrap();

    let acc = accuracy(&forest.predict_batch(&test_x).unwrap(), &test_y);
    assert!(acc > 0.9, "random forest holdout accuracy {acc} <= 0.9");
}

#[test]
fn extra_trees_holdout_accuracy() {
    let (train_x, train_y) = make_classification(300, 42);
    let (test_x, test_y) = make_classification(90, 7);
    let forest = RandomForestConfig::extra_trees(25)
        .unwrap()
        .with_max_depth(Some(10))
        .fit(&train_x, &train_y)
        .unwrap();

    let acc = accuracy(&forest.predict_batch(&test_x).unwrap(), &test_y);
    assert!(acc > 0.9, "extra-trees holdout accuracy {acc} <= 0.9");
}

// ---------------------------------------------------------------------------
// b) deterministic_predictions
// ---------------------------------------------------------------------------

/// Same config and seed must produce identical probabilities across two runs.
#[test]
fn deterministic_predictions() {
    let (features, labels) = make_classification(300, 42);
    let rf_config = RandomForestConfig::new(30).unwrap().with_seed(42);

    let forest1 = rf_config.fit(&features, &labels).unwrap();
    let forest2 = rf_config.fit(&features, &labels).unwrap();

    assert_eq!(
        forest1.predict_proba_batch(&features).unwrap(),
        forest2.predict_proba_batch(&features).unwrap(),
        "probabilities differ across runs with the same seed"
    );
}

// ---------------------------------------------------------------------------
// c) depth limit
// ---------------------------------------------------------------------------

#[test]
fn max_depth_bounds_every_tree() {
    let (features, labels) = make_classification(300, 42);
    let forest = RandomForestConfig::new(10)
        .unwrap()
        .with_max_depth(Some(2))
        .fit(&features, &labels)
        .unwrap();

    assert!(forest.trees().iter().all(|t| t.depth() <= 2));
}
