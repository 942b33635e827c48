//! Area under the ROC curve.
//!
//! All variants use the Mann-Whitney rank-sum form with average ranks for
//! tied scores, which equals the trapezoidal area under the ROC curve.

use tracing::debug;

use crate::error::EvalError;
use crate::validate::check_probabilities;

/// Binary AUC of `scores` against a positive/negative labelling.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`EvalError::LengthMismatch`] | `scores` and `positive` differ in length |
/// | [`EvalError::SingleClass`] | All samples are positive, or all negative |
pub fn binary_auc(scores: &[f64], positive: &[bool]) -> Result<f64, EvalError> {
    if scores.len() != positive.len() {
        return Err(EvalError::LengthMismatch {
            what: "scores",
            expected: positive.len(),
            got: scores.len(),
        });
    }
    let n_pos = positive.iter().filter(|&&p| p).count();
    let n_neg = positive.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(EvalError::SingleClass {
            n_present: usize::from(n_pos > 0) + usize::from(n_neg > 0),
        });
    }
    Ok(rank_sum_auc(scores, positive, n_pos, n_neg))
}

fn rank_sum_auc(scores: &[f64], positive: &[bool], n_pos: usize, n_neg: usize) -> f64 {
    let n = scores.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_unstable_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut pos_rank_sum = 0.0;
    let mut start = 0usize;
    while start < n {
        let mut end = start;
        while end + 1 < n && scores[order[end + 1]] == scores[order[start]] {
            end += 1;
        }
        // One-based ranks start+1..=end+1 share their mean.
        let avg_rank = (start + end) as f64 / 2.0 + 1.0;
        let tied_pos = order[start..=end].iter().filter(|&&i| positive[i]).count();
        pos_rank_sum += avg_rank * tied_pos as f64;
        start = end + 1;
    }

    let n_pos = n_pos as f64;
    (pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg as f64)
}

/// Macro-averaged one-vs-one AUC (Hand & Till).
///
/// For every pair of classes present in `labels`, restrict to samples of
/// those two classes and average the AUC of each class's probability column
/// against the other; the result is the mean over pairs.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`EvalError::EmptyInput`] | `labels` is empty |
/// | [`EvalError::LengthMismatch`] | `proba` has a different length than `labels` |
/// | [`EvalError::ProbabilityWidth`] | A probability row is not `n_classes` wide |
/// | [`EvalError::LabelOutOfRange`] | A label is not below `n_classes` |
/// | [`EvalError::SingleClass`] | Fewer than two classes occur in `labels` |
pub fn ovo_macro_auc(labels: &[usize], proba: &[Vec<f64>], n_classes: usize) -> Result<f64, EvalError> {
    check_probabilities(labels, proba, n_classes)?;
    let present = present_classes(labels, n_classes);
    if present.len() < 2 {
        return Err(EvalError::SingleClass {
            n_present: present.len(),
        });
    }

    let mut total = 0.0;
    let mut n_pairs = 0usize;
    for (i, &a) in present.iter().enumerate() {
        for &b in &present[i + 1..] {
            let rows: Vec<usize> = (0..labels.len())
                .filter(|&r| labels[r] == a || labels[r] == b)
                .collect();
            let is_a: Vec<bool> = rows.iter().map(|&r| labels[r] == a).collect();
            let is_b: Vec<bool> = is_a.iter().map(|&x| !x).collect();
            let score_a: Vec<f64> = rows.iter().map(|&r| proba[r][a]).collect();
            let score_b: Vec<f64> = rows.iter().map(|&r| proba[r][b]).collect();

            let n_a = is_a.iter().filter(|&&x| x).count();
            let n_b = rows.len() - n_a;
            let auc_ab = rank_sum_auc(&score_a, &is_a, n_a, n_b);
            let auc_ba = rank_sum_auc(&score_b, &is_b, n_b, n_a);
            debug!(class_a = a, class_b = b, auc_ab, auc_ba, "pairwise auc");
            total += (auc_ab + auc_ba) / 2.0;
            n_pairs += 1;
        }
    }
    Ok(total / n_pairs as f64)
}

/// AUC of a probabilistic classifier.
///
/// With exactly two classes this is the binary AUC of the class-1 column.
/// With more it is [`ovo_macro_auc`].
///
/// # Errors
///
/// Same as [`ovo_macro_auc`].
pub fn roc_auc(labels: &[usize], proba: &[Vec<f64>], n_classes: usize) -> Result<f64, EvalError> {
    if n_classes == 2 {
        check_probabilities(labels, proba, n_classes)?;
        let scores: Vec<f64> = proba.iter().map(|row| row[1]).collect();
        let positive: Vec<bool> = labels.iter().map(|&l| l == 1).collect();
        return binary_auc(&scores, &positive);
    }
    ovo_macro_auc(labels, proba, n_classes)
}

fn present_classes(labels: &[usize], n_classes: usize) -> Vec<usize> {
    let mut seen = vec![false; n_classes];
    for &l in labels {
        seen[l] = true;
    }
    (0..n_classes).filter(|&c| seen[c]).collect()
}
