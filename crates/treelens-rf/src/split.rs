use rand::Rng;
use rand::seq::SliceRandom;

use crate::node::{FeatureIndex, Impurity};

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCriterion {
    /// Gini impurity: 1 - Σ(p_i²)
    Gini,
    /// Information entropy: -Σ(p_i · ln(p_i))
    Entropy,
}

impl SplitCriterion {
    /// Compute the impurity of a node from its class counts.
    ///
    /// Returns zero when `n_samples` is zero.
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> Impurity {
        if n_samples == 0 {
            return Impurity::new(0.0);
        }
        let n = n_samples as f64;
        let value = match self {
            SplitCriterion::Gini => {
                let sum_sq: f64 = class_counts
                    .iter()
                    .map(|&c| {
                        let p = c as f64 / n;
                        p * p
                    })
                    .sum();
                1.0 - sum_sq
            }
            SplitCriterion::Entropy => -class_counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.ln()
                })
                .sum::<f64>(),
        };
        Impurity::new(value)
    }
}

/// How a candidate feature's threshold is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMethod {
    /// Scan every boundary between sorted distinct values and keep the best.
    Exact,
    /// Draw one threshold uniformly between the node's min and max value
    /// (Extremely Randomized Trees).
    ExtraTrees,
}

/// Best split found for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    pub(crate) left_indices: Vec<usize>,
    pub(crate) right_indices: Vec<usize>,
}

/// Find the best split over up to `max_features` non-constant features,
/// visited in random order.
///
/// Constant features (all values equal within the node) do not count
/// towards `max_features`. Returns `None` when no feature admits a split
/// that leaves at least `min_samples_leaf` samples on each side.
///
/// `features` is column-major: `features[feature_idx][sample_idx]`, and
/// `sample_indices` index into the inner vectors.
#[allow(clippy::too_many_arguments)]
pub(crate) fn find_split(
    features: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
    criterion: SplitCriterion,
    method: SplitMethod,
    max_features: usize,
    min_samples_leaf: usize,
    rng: &mut impl Rng,
) -> Option<SplitResult> {
    let n_samples = sample_indices.len();
    if n_samples < 2 || features.is_empty() {
        return None;
    }

    let mut parent_counts = vec![0usize; n_classes];
    for &si in sample_indices {
        parent_counts[labels[si]] += 1;
    }
    let parent_impurity = criterion.impurity(&parent_counts, n_samples).value();

    let mut feature_order: Vec<usize> = (0..features.len()).collect();
    feature_order.shuffle(rng);

    let mut best: Option<(FeatureIndex, f64, f64)> = None;
    let mut visited = 0usize;

    for feat_idx in feature_order {
        if visited >= max_features {
            break;
        }
        let column = &features[feat_idx];
        let (lo, hi) = sample_indices
            .iter()
            .map(|&si| column[si])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if lo >= hi {
            continue;
        }
        visited += 1;

        let candidate = match method {
            SplitMethod::Exact => best_exact_threshold(
                column,
                labels,
                sample_indices,
                &parent_counts,
                parent_impurity,
                criterion,
                min_samples_leaf,
            ),
            SplitMethod::ExtraTrees => {
                let threshold = rng.gen_range(lo..hi);
                score_threshold(
                    column,
                    labels,
                    sample_indices,
                    n_classes,
                    parent_impurity,
                    criterion,
                    min_samples_leaf,
                    threshold,
                )
                .map(|decrease| (threshold, decrease))
            }
        };

        if let Some((threshold, decrease)) = candidate
            && best.is_none_or(|(_, _, d)| decrease > d)
        {
            best = Some((FeatureIndex::new(feat_idx), threshold, decrease));
        }
    }

    let (feature, threshold, _) = best?;
    let column = &features[feature.index()];
    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = sample_indices
        .iter()
        .copied()
        .partition(|&si| column[si] <= threshold);
    if left_indices.is_empty() || right_indices.is_empty() {
        return None;
    }

    Some(SplitResult {
        feature,
        threshold,
        left_indices,
        right_indices,
    })
}

/// Sort the node's values for one feature and scan all midpoints between
/// distinct neighbours, returning the best `(threshold, decrease)`.
fn best_exact_threshold(
    column: &[f64],
    labels: &[usize],
    sample_indices: &[usize],
    parent_counts: &[usize],
    parent_impurity: f64,
    criterion: SplitCriterion,
    min_samples_leaf: usize,
) -> Option<(f64, f64)> {
    let n_samples = sample_indices.len();
    let mut sorted: Vec<(f64, usize)> = sample_indices
        .iter()
        .map(|&si| (column[si], labels[si]))
        .collect();
    sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

    let mut left_counts = vec![0usize; parent_counts.len()];
    let mut right_counts = parent_counts.to_vec();
    let mut best: Option<(f64, f64)> = None;

    for i in 0..(n_samples - 1) {
        let (value, class) = sorted[i];
        left_counts[class] += 1;
        right_counts[class] -= 1;

        let next = sorted[i + 1].0;
        if value == next {
            continue;
        }
        let n_left = i + 1;
        let n_right = n_samples - n_left;
        if n_left < min_samples_leaf || n_right < min_samples_leaf {
            continue;
        }

        let decrease = weighted_decrease(
            n_samples,
            parent_impurity,
            criterion.impurity(&left_counts, n_left).value(),
            n_left,
            criterion.impurity(&right_counts, n_right).value(),
            n_right,
        );
        if best.is_none_or(|(_, d)| decrease > d) {
            // The midpoint of adjacent floats can round up to `next`.
            let mut threshold = (value + next) / 2.0;
            if threshold >= next {
                threshold = value;
            }
            best = Some((threshold, decrease));
        }
    }

    best
}

/// Impurity decrease of a fixed threshold, or `None` if a side is too small.
#[allow(clippy::too_many_arguments)]
fn score_threshold(
    column: &[f64],
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
    parent_impurity: f64,
    criterion: SplitCriterion,
    min_samples_leaf: usize,
    threshold: f64,
) -> Option<f64> {
    let mut left_counts = vec![0usize; n_classes];
    let mut right_counts = vec![0usize; n_classes];
    for &si in sample_indices {
        if column[si] <= threshold {
            left_counts[labels[si]] += 1;
        } else {
            right_counts[labels[si]] += 1;
        }
    }
    let n_left: usize = left_counts.iter().sum();
    let n_right = sample_indices.len() - n_left;
    if n_left < min_samples_leaf || n_right < min_samples_leaf {
        return None;
    }
    Some(weighted_decrease(
        sample_indices.len(),
        parent_impurity,
        criterion.impurity(&left_counts, n_left).value(),
        n_left,
        criterion.impurity(&right_counts, n_right).value(),
        n_right,
    ))
}

/// Weighted impurity decrease: `n·I(parent) - n_l·I(left) - n_r·I(right)`.
fn weighted_decrease(
    n: usize,
    parent: f64,
    left: f64,
    n_left: usize,
    right: f64,
    n_right: usize,
) -> f64 {
    (n as f64) * parent - (n_left as f64) * left - (n_right as f64) * right
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn split_one_feature(
        values: Vec<f64>,
        labels: &[usize],
        method: SplitMethod,
        min_samples_leaf: usize,
    ) -> Option<SplitResult> {
        let sample_indices: Vec<usize> = (0..values.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        find_split(
            &[values],
            labels,
            &sample_indices,
            2,
            SplitCriterion::Gini,
            method,
            1,
            min_samples_leaf,
            &mut rng,
        )
    }

    #[test]
    fn gini_values() {
        assert!(SplitCriterion::Gini.impurity(&[10, 0, 0], 10).value().abs() < f64::EPSILON);
        assert!((SplitCriterion::Gini.impurity(&[5, 5], 10).value() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn entropy_values() {
        assert!(SplitCriterion::Entropy.impurity(&[10, 0], 10).value().abs() < f64::EPSILON);
        let balanced = SplitCriterion::Entropy.impurity(&[5, 5], 10).value();
        assert!((balanced - 2.0_f64.ln()).abs() < 1e-10);
    }

    #[test]
    fn exact_finds_midpoint_between_groups() {
        let split = split_one_feature(
            vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0],
            &[0, 0, 0, 1, 1, 1],
            SplitMethod::Exact,
            1,
        )
        .expect("should find a split");
        assert_eq!(split.feature.index(), 0);
        assert!((split.threshold - 6.5).abs() < 1e-12);
        assert_eq!(split.left_indices, vec![0, 1, 2]);
        assert_eq!(split.right_indices, vec![3, 4, 5]);
    }

    #[test]
    fn exact_threshold_between_adjacent_floats() {
        let below = f64::from_bits(2.0_f64.to_bits() - 1);
        let split = split_one_feature(vec![below, 2.0, below, 2.0], &[0, 1, 0, 1], SplitMethod::Exact, 1)
            .expect("should find a split");
        assert!(split.threshold < 2.0);
        assert_eq!(split.left_indices, vec![0, 2]);
        assert_eq!(split.right_indices, vec![1, 3]);
    }

    #[test]
    fn extra_trees_threshold_within_range() {
        let split = split_one_feature(
            vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0],
            &[0, 0, 0, 1, 1, 1],
            SplitMethod::ExtraTrees,
            1,
        )
        .expect("should find a split");
        assert!(split.threshold >= 1.0 && split.threshold < 12.0);
        assert!(!split.left_indices.is_empty());
        assert!(!split.right_indices.is_empty());
    }

    #[test]
    fn constant_feature_returns_none() {
        for method in [SplitMethod::Exact, SplitMethod::ExtraTrees] {
            let split = split_one_feature(vec![5.0; 4], &[0, 0, 1, 1], method, 1);
            assert!(split.is_none());
        }
    }

    #[test]
    fn min_samples_leaf_enforced() {
        let split = split_one_feature(vec![1.0, 10.0], &[0, 1], SplitMethod::Exact, 2);
        assert!(split.is_none());
    }

    #[test]
    fn constant_features_do_not_use_up_budget() {
        // Feature 0 is constant; with max_features = 1 the informative
        // feature 1 must still be found.
        let features = vec![vec![7.0; 6], vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]];
        let labels = [0, 0, 0, 1, 1, 1];
        let sample_indices: Vec<usize> = (0..6).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let split = find_split(
            &features,
            &labels,
            &sample_indices,
            2,
            SplitCriterion::Gini,
            SplitMethod::Exact,
            1,
            1,
            &mut rng,
        )
        .expect("should find a split");
        assert_eq!(split.feature.index(), 1);
    }
}
