//! Scatterplot matrix of the test set, colored by correctness.

use plotly::common::{Marker, Mode};
use plotly::layout::{Annotation, GridPattern, Layout, LayoutGrid};
use plotly::{Plot, Scatter};

const PANEL_SIZE: usize = 250;
const CORRECT_COLOR: &str = "steelblue";
const ERROR_COLOR: &str = "crimson";

/// Build the scatterplot matrix.
///
/// The first half of `feature_names` are row facets (y axis) and the rest
/// are column facets (x axis). `correct[i]` tells whether test row `i` was
/// predicted right. Each panel draws at most `max_points` rows, taken from
/// the start of the test set.
#[must_use]
pub fn scatter_matrix(
    feature_names: &[String],
    rows: &[Vec<f64>],
    correct: &[bool],
    max_points: usize,
) -> Plot {
    let (row_features, col_features) = feature_names.split_at(feature_names.len() / 2);
    let n_points = rows.len().min(correct.len()).min(max_points);
    let rows = &rows[..n_points];
    let correct = &correct[..n_points];

    let mut plot = Plot::new();
    for (r, _) in row_features.iter().enumerate() {
        for (c, _) in col_features.iter().enumerate() {
            let panel = r * col_features.len() + c;
            let x_feature = row_features.len() + c;
            let (x_axis, y_axis) = axis_ids(panel);

            for (is_correct, name, color) in [(true, "correct", CORRECT_COLOR), (false, "misclassified", ERROR_COLOR)] {
                let (xs, ys): (Vec<f64>, Vec<f64>) = rows
                    .iter()
                    .zip(correct)
                    .filter(|&(_, &ok)| ok == is_correct)
                    .map(|(row, _)| (row[x_feature], row[r]))
                    .unzip();
                let trace = Scatter::new(xs, ys)
                    .mode(Mode::Markers)
                    .name(name)
                    .legend_group(name)
                    .show_legend(panel == 0)
                    .marker(Marker::new().color(color).size(5).opacity(0.7))
                    .x_axis(&x_axis)
                    .y_axis(&y_axis);
                plot.add_trace(trace);
            }
        }
    }

    plot.set_layout(layout(row_features, col_features));
    plot
}

/// Axis ids of panel `panel` in row-major order.
fn axis_ids(panel: usize) -> (String, String) {
    if panel == 0 {
        ("x".to_string(), "y".to_string())
    } else {
        (format!("x{}", panel + 1), format!("y{}", panel + 1))
    }
}

fn layout(row_features: &[String], col_features: &[String]) -> Layout {
    let n_rows = row_features.len().max(1);
    let n_cols = col_features.len().max(1);

    // Plotly only exposes setters for the first eight axes, so facet names
    // are paper-anchored annotations instead of axis titles.
    let mut annotations: Vec<Annotation> = col_features
        .iter()
        .enumerate()
        .map(|(c, name)| {
            Annotation::new()
                .text(name)
                .x_ref("paper")
                .y_ref("paper")
                .x((c as f64 + 0.5) / n_cols as f64)
                .y(1.02)
                .show_arrow(false)
        })
        .collect();
    annotations.extend(row_features.iter().enumerate().map(|(r, name)| {
        Annotation::new()
            .text(name)
            .x_ref("paper")
            .y_ref("paper")
            .x(-0.04)
            .y(1.0 - (r as f64 + 0.5) / n_rows as f64)
            .text_angle(-90.0)
            .show_arrow(false)
    }));

    Layout::new()
        .grid(
            LayoutGrid::new()
                .rows(n_rows)
                .columns(n_cols)
                .pattern(GridPattern::Independent),
        )
        .annotations(annotations)
        .width(PANEL_SIZE * n_cols + 100)
        .height(PANEL_SIZE * n_rows + 100)
}
