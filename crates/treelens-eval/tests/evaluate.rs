//! End-to-end checks of `evaluate` on a small three-class problem.

use treelens_eval::{EvalError, RowKind, evaluate};

fn class_names() -> Vec<String> {
    ["setosa", "versicolor", "virginica"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn one_hot(labels: &[usize], confidence: f64) -> Vec<Vec<f64>> {
    labels
        .iter()
        .map(|&l| {
            let mut row = vec![(1.0 - confidence) / 2.0; 3];
            row[l] = confidence;
            row
        })
        .collect()
}

#[test]
fn consistent_metrics_on_imperfect_predictions() {
    let actual = [0, 0, 1, 1, 1, 2, 2, 2, 2, 0];
    let predicted = [0, 0, 1, 2, 1, 2, 2, 1, 2, 0];
    let proba = one_hot(&predicted, 0.8);

    let report = evaluate(&actual, &predicted, &proba, &class_names()).unwrap();

    assert!((0.0..=1.0).contains(&report.auc));
    assert!((report.accuracy() - 0.8).abs() < 1e-12);

    let cm = &report.confusion_matrix;
    assert_eq!(cm.names(), &["setosa", "versicolor", "virginica"]);
    assert_eq!(cm.actual_totals(), vec![3, 3, 4]);
    assert_eq!(cm.predicted_totals(), vec![3, 3, 4]);

    let rows = report.classification_report.rows();
    assert_eq!(rows.len(), 3 + 3);
    assert_eq!(rows[3].kind, RowKind::Accuracy);
    for (row, total) in rows.iter().zip(cm.actual_totals()) {
        assert_eq!(row.support, total);
    }
}

#[test]
fn report_serializes_for_the_json_api() {
    let actual = [0, 1, 2];
    let report = evaluate(&actual, &actual, &one_hot(&actual, 0.9), &class_names()).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert!((json["auc"].as_f64().unwrap() - 1.0).abs() < 1e-12);
    assert_eq!(json["classification_report"]["rows"][4]["kind"], "macro_avg");
    assert_eq!(json["confusion_matrix"]["counts"][1][1], 1);
}

#[test]
fn single_class_ground_truth_is_rejected() {
    let actual = [1, 1, 1];
    let err = evaluate(&actual, &actual, &one_hot(&actual, 0.9), &class_names()).unwrap_err();
    assert!(matches!(err, EvalError::SingleClass { n_present: 1 }));
}
