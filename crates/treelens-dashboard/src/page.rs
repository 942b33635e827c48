//! HTML rendering of the dashboard.

use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use treelens_data::DatasetName;
use treelens_eval::{ClassificationReport, ConfusionMatrix, RowKind};

use crate::DashboardConfig;
use crate::charts::scatter_matrix;
use crate::model::{MAX_DEPTH_RANGE, ModelKind, N_ESTIMATORS_RANGE};
use crate::pipeline::{DashboardView, Selection};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";
const FORM_ID: &str = "controls";

const STYLE: &str = "
body { display: flex; margin: 0; font-family: sans-serif; }
aside { width: 18rem; min-height: 100vh; padding: 1rem; background: #f0f2f6; }
aside label { display: block; margin-top: 1rem; font-weight: bold; }
aside select, aside input[type=range] { width: 100%; }
main { flex: 1; padding: 1rem 2rem; overflow-x: auto; }
table { border-collapse: collapse; margin: 0.5rem 0 1rem; }
th, td { border: 1px solid #ddd; padding: 0.25rem 0.5rem; text-align: right; }
tr.error { background-color: red; }
.caption { color: #666; font-size: 0.9rem; }
";

/// Render the full dashboard page for one run.
#[must_use]
pub fn render_page(selection: &Selection, view: &DashboardView, config: &DashboardConfig) -> Markup {
    let title = format!("{} on {}", selection.model, selection.dataset);
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) }
                style { (PreEscaped(STYLE)) }
                @if selection.show_distributions {
                    script src=(PLOTLY_CDN) {}
                }
            }
            body {
                (sidebar(selection))
                main {
                    h1 { (title) }
                    p.caption { (training_note(view)) }
                    h2 { "Model performance in test" }
                    p { (format!("AUC: {:.2}", view.evaluation.auc)) }
                    (report_table(&view.evaluation.classification_report))
                    h2 { "Confusion Matrix" }
                    (confusion_table(&view.evaluation.confusion_matrix))
                    (checkbox("show_test_data", "Show test data", selection.show_test_data))
                    @if selection.show_test_data {
                        h2 { "Test data" }
                        (test_data_table(view, config.max_table_rows()))
                    }
                    (checkbox("show_distributions", "Show test distributions", selection.show_distributions))
                    @if selection.show_distributions {
                        h2 { "Distributions" }
                        (distributions(view, config.max_chart_points()))
                    }
                }
            }
        }
    }
}

/// Render a standalone error page.
#[must_use]
pub fn render_error(status: StatusCode, message: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (status) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                main {
                    h1 { (status.canonical_reason().unwrap_or("Error")) }
                    pre { (message) }
                    p { a href="/" { "Back to the dashboard" } }
                }
            }
        }
    }
}

fn training_note(view: &DashboardView) -> String {
    let fitted = view.model_summary;
    let source = if view.model_cache.is_hit() {
        "Model loaded from cache".to_string()
    } else {
        format!("Model built in {} ms", view.fit_time.as_millis())
    };
    format!(
        "{source}: {} tree(s), {} nodes, depth {}.",
        fitted.n_trees, fitted.n_nodes, fitted.depth
    )
}

fn sidebar(selection: &Selection) -> Markup {
    let params = selection.hyperparameters;
    html! {
        aside {
            form id=(FORM_ID) method="get" action="/" {
                h2 { "Model and dataset selection" }
                label for="dataset" { "Dataset" }
                select id="dataset" name="dataset" onchange="this.form.submit()" {
                    @for name in DatasetName::ALL {
                        option value=(name) selected[name == selection.dataset] { (name) }
                    }
                }
                (slider("n_estimators", params.n_estimators(), *N_ESTIMATORS_RANGE.start(), *N_ESTIMATORS_RANGE.end()))
                (slider("max_depth", params.max_depth(), *MAX_DEPTH_RANGE.start(), *MAX_DEPTH_RANGE.end()))
                label for="model" { "Model" }
                select id="model" name="model" onchange="this.form.submit()" {
                    @for kind in ModelKind::ALL {
                        option value=(kind) selected[kind == selection.model] { (kind) }
                    }
                }
            }
        }
    }
}

fn slider(name: &str, value: usize, min: usize, max: usize) -> Markup {
    html! {
        label for=(name) { (name) ": " output id={ (name) "_value" } { (value) } }
        input type="range" id=(name) name=(name) min=(min) max=(max) value=(value)
            oninput={ "document.getElementById('" (name) "_value').value = this.value" }
            onchange="this.form.submit()";
    }
}

fn checkbox(name: &str, text: &str, checked: bool) -> Markup {
    html! {
        p {
            label {
                input type="checkbox" name=(name) form=(FORM_ID) checked[checked]
                    onchange="this.form.submit()";
                " " (text)
            }
        }
    }
}

/// Classes and summaries as columns, metrics as rows.
fn report_table(report: &ClassificationReport) -> Markup {
    let rows = report.rows();
    html! {
        table {
            thead {
                tr {
                    th {}
                    @for row in rows { th { (row.label) } }
                }
            }
            tbody {
                tr {
                    th { "precision" }
                    @for row in rows { td { (format!("{:.6}", row.precision)) } }
                }
                tr {
                    th { "recall" }
                    @for row in rows { td { (format!("{:.6}", row.recall)) } }
                }
                tr {
                    th { "f1-score" }
                    @for row in rows { td { (format!("{:.6}", row.f1_score)) } }
                }
                tr {
                    th { "support" }
                    @for row in rows {
                        @if row.kind == RowKind::Accuracy {
                            td { (format!("{:.6}", row.f1_score)) }
                        } @else {
                            td { (row.support) }
                        }
                    }
                }
            }
        }
    }
}

fn confusion_table(matrix: &ConfusionMatrix) -> Markup {
    html! {
        table {
            thead {
                tr {
                    th { "Predicted" }
                    @for name in matrix.names() { th { (name) } }
                }
                tr { th { "Actual" } }
            }
            tbody {
                @for (name, counts) in matrix.names().iter().zip(matrix.as_rows()) {
                    tr {
                        th { (name) }
                        @for count in counts { td { (count) } }
                    }
                }
            }
        }
    }
}

fn test_data_table(view: &DashboardView, max_rows: usize) -> Markup {
    let data = &view.data;
    let split = data.split();
    let class_names = data.class_names();
    let class_name = |class: usize| class_names.get(class).map_or("?", String::as_str);
    let total = split.test_labels().len();
    let shown = total.min(max_rows);

    html! {
        @if shown < total {
            p.caption { (format!("Showing the first {shown} of {total} test rows.")) }
        }
        table {
            thead {
                tr {
                    th {}
                    @for name in data.feature_names() { th { (name) } }
                    th { "target" }
                    th { "predicted" }
                }
            }
            tbody {
                @for i in 0..shown {
                    tr.error[view.is_error(i)] {
                        th { (i) }
                        @for value in &split.test_features()[i] { td { (value) } }
                        td { (class_name(split.test_labels()[i])) }
                        td { (class_name(view.predictions[i])) }
                    }
                }
            }
        }
    }
}

fn distributions(view: &DashboardView, max_points: usize) -> Markup {
    let split = view.data.split();
    let total = split.test_labels().len();
    let correct: Vec<bool> = (0..total).map(|i| !view.is_error(i)).collect();
    let plot = scatter_matrix(view.data.feature_names(), split.test_features(), &correct, max_points);

    html! {
        @if max_points < total {
            p.caption { (format!("Each panel shows the first {max_points} of {total} test rows.")) }
        }
        (PreEscaped(plot.to_inline_html(Some("distributions"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_page_shows_reason_and_message() {
        let page = render_error(StatusCode::BAD_REQUEST, "max_depth must be in [1, 150], got 0")
            .into_string();
        assert!(page.contains("Bad Request"));
        assert!(page.contains("max_depth must be in [1, 150], got 0"));
    }

    #[test]
    fn sidebar_marks_current_choices() {
        let selection = Selection {
            dataset: DatasetName::Wine,
            model: ModelKind::RandomForest,
            ..Selection::default()
        };
        let html = sidebar(&selection).into_string();
        assert!(html.contains("Model and dataset selection"));
        assert!(html.contains(r#"<option value="Wine" selected>Wine</option>"#));
        assert!(html.contains(r#"<option value="RandomForestClassifier" selected>"#));
        assert!(html.contains(r#"max="150""#));
    }
}
