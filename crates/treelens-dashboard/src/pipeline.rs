//! One full dashboard run: load, train, predict, evaluate.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use treelens_data::{CacheStatus, DatasetName, DatasetProvider, LoadedDataset};
use treelens_eval::{ClassificationReport, ConfusionMatrix, EvaluationReport, evaluate};

use crate::model::{Hyperparameters, ModelKind, ModelSummary};
use crate::trainer::Trainer;
use crate::{DashboardConfig, DashboardError};

/// Long-lived state shared by every run: both caches and the display options.
#[derive(Debug)]
pub struct Session {
    provider: DatasetProvider,
    trainer: Trainer,
    config: DashboardConfig,
}

impl Session {
    /// Create a session from its parts.
    #[must_use]
    pub fn new(provider: DatasetProvider, trainer: Trainer, config: DashboardConfig) -> Self {
        Self {
            provider,
            trainer,
            config,
        }
    }

    /// Return the dataset provider.
    #[must_use]
    pub fn provider(&self) -> &DatasetProvider {
        &self.provider
    }

    /// Return the model trainer.
    #[must_use]
    pub fn trainer(&self) -> &Trainer {
        &self.trainer
    }

    /// Return the display options.
    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }
}

/// Raw query string of the dashboard form.
///
/// Every field is optional; missing ones take their defaults in
/// [`Selection::from_query`]. Checkboxes are present only when ticked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub dataset: Option<String>,
    pub model: Option<String>,
    pub n_estimators: Option<String>,
    pub max_depth: Option<String>,
    pub show_test_data: Option<String>,
    pub show_distributions: Option<String>,
}

/// Validated widget state for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub dataset: DatasetName,
    pub model: ModelKind,
    pub hyperparameters: Hyperparameters,
    pub show_test_data: bool,
    pub show_distributions: bool,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            dataset: DatasetName::Iris,
            model: ModelKind::DecisionTree,
            hyperparameters: Hyperparameters::default(),
            show_test_data: false,
            show_distributions: false,
        }
    }
}

impl Selection {
    /// Parse the form's query parameters, filling in defaults.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DashboardError::Data`] | Unknown dataset name |
    /// | [`DashboardError::InvalidSelection`] | Unknown model or non-numeric slider value |
    /// | [`DashboardError::InvalidHyperparameter`] | Slider value out of range |
    pub fn from_query(query: &DashboardQuery) -> Result<Self, DashboardError> {
        let defaults = Self::default();
        let dataset = match non_empty(&query.dataset) {
            Some(raw) => raw.parse::<DatasetName>()?,
            None => defaults.dataset,
        };
        let model = match non_empty(&query.model) {
            Some(raw) => raw.parse::<ModelKind>()?,
            None => defaults.model,
        };
        let n_estimators = parse_count(
            "n_estimators",
            &query.n_estimators,
            defaults.hyperparameters.n_estimators(),
        )?;
        let max_depth = parse_count(
            "max_depth",
            &query.max_depth,
            defaults.hyperparameters.max_depth(),
        )?;

        Ok(Self {
            dataset,
            model,
            hyperparameters: Hyperparameters::new(n_estimators, max_depth)?,
            show_test_data: is_checked(&query.show_test_data),
            show_distributions: is_checked(&query.show_distributions),
        })
    }
}

fn non_empty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_count(
    field: &'static str,
    raw: &Option<String>,
    default: usize,
) -> Result<usize, DashboardError> {
    match non_empty(raw) {
        None => Ok(default),
        Some(s) => s.parse().map_err(|_| DashboardError::InvalidSelection {
            field,
            value: s.to_string(),
        }),
    }
}

fn is_checked(raw: &Option<String>) -> bool {
    non_empty(raw).is_some_and(|s| !matches!(s, "off" | "false" | "0"))
}

/// Everything the page and the JSON API show for one run.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub selection: Selection,
    pub data: Arc<LoadedDataset>,
    /// Predicted class per test row.
    pub predictions: Vec<usize>,
    /// Class probabilities per test row, one column per class.
    pub probabilities: Vec<Vec<f64>>,
    pub evaluation: EvaluationReport,
    pub model_summary: ModelSummary,
    pub dataset_cache: CacheStatus,
    pub model_cache: CacheStatus,
    /// Time spent obtaining the model, near zero on a cache hit.
    pub fit_time: Duration,
}

impl DashboardView {
    /// `true` when the prediction for test row `row` is wrong.
    #[must_use]
    pub fn is_error(&self, row: usize) -> bool {
        self.data
            .split()
            .test_labels()
            .get(row)
            .zip(self.predictions.get(row))
            .is_some_and(|(actual, predicted)| actual != predicted)
    }

    /// Number of misclassified test rows.
    #[must_use]
    pub fn n_errors(&self) -> usize {
        (0..self.predictions.len()).filter(|&row| self.is_error(row)).count()
    }

    /// Serializable digest for the JSON API and the `report` command.
    #[must_use]
    pub fn summary(&self) -> RunSummary<'_> {
        let split = self.data.split();
        RunSummary {
            dataset: self.selection.dataset,
            model: self.selection.model.display_name(),
            n_estimators: self.selection.hyperparameters.n_estimators(),
            max_depth: self.selection.hyperparameters.max_depth(),
            auc: self.evaluation.auc,
            accuracy: self.evaluation.accuracy(),
            n_train: split.train_labels().len(),
            n_test: split.test_labels().len(),
            n_errors: self.n_errors(),
            model_summary: self.model_summary,
            dataset_cached: self.dataset_cache.is_hit(),
            model_cached: self.model_cache.is_hit(),
            fit_ms: self.fit_time.as_secs_f64() * 1000.0,
            classification_report: &self.evaluation.classification_report,
            confusion_matrix: &self.evaluation.confusion_matrix,
        }
    }
}

/// JSON digest of a [`DashboardView`].
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary<'a> {
    pub dataset: DatasetName,
    pub model: &'static str,
    pub n_estimators: usize,
    pub max_depth: usize,
    pub auc: f64,
    pub accuracy: f64,
    pub n_train: usize,
    pub n_test: usize,
    pub n_errors: usize,
    #[serde(rename = "fitted")]
    pub model_summary: ModelSummary,
    pub dataset_cached: bool,
    pub model_cached: bool,
    pub fit_ms: f64,
    pub classification_report: &'a ClassificationReport,
    pub confusion_matrix: &'a ConfusionMatrix,
}

/// Run the whole pipeline for `selection`.
///
/// Loading and training go through the session caches; prediction and
/// evaluation always run on the full test set.
///
/// # Errors
///
/// Any [`DashboardError`] from loading, training, predicting or evaluating.
#[instrument(skip(session), fields(dataset = %selection.dataset, model = %selection.model))]
pub fn run_dashboard(session: &Session, selection: &Selection) -> Result<DashboardView, DashboardError> {
    let (data, dataset_cache) = session.provider.load_with_status(selection.dataset)?;
    let outcome = session
        .trainer
        .train(&data, selection.model, selection.hyperparameters)?;

    let split = data.split();
    let predict_error = |source| DashboardError::Prediction {
        model: selection.model,
        source,
    };
    let predictions = outcome
        .model
        .predict_batch(split.test_features())
        .map_err(predict_error)?;
    let probabilities = outcome
        .model
        .predict_proba_batch(split.test_features())
        .map_err(predict_error)?;
    let evaluation = evaluate(
        split.test_labels(),
        &predictions,
        &probabilities,
        data.class_names(),
    )?;
    debug!(auc = evaluation.auc, accuracy = evaluation.accuracy(), "run complete");

    Ok(DashboardView {
        selection: *selection,
        model_summary: outcome.model.summary(),
        data,
        predictions,
        probabilities,
        evaluation,
        dataset_cache,
        model_cache: outcome.cache,
        fit_time: outcome.elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> DashboardQuery {
        let mut q = DashboardQuery::default();
        for &(key, value) in pairs {
            let value = Some(value.to_string());
            match key {
                "dataset" => q.dataset = value,
                "model" => q.model = value,
                "n_estimators" => q.n_estimators = value,
                "max_depth" => q.max_depth = value,
                "show_test_data" => q.show_test_data = value,
                "show_distributions" => q.show_distributions = value,
                _ => panic!("unknown key {key}"),
            }
        }
        q
    }

    #[test]
    fn empty_query_uses_defaults() {
        let selection = Selection::from_query(&DashboardQuery::default()).unwrap();
        assert_eq!(selection, Selection::default());
        assert_eq!(selection.hyperparameters.n_estimators(), 25);
        assert_eq!(selection.hyperparameters.max_depth(), 10);
    }

    #[test]
    fn full_query_is_parsed() {
        let selection = Selection::from_query(&query(&[
            ("dataset", "wine"),
            ("model", "ExtraTreesClassifier"),
            ("n_estimators", "50"),
            ("max_depth", "3"),
            ("show_test_data", "on"),
        ]))
        .unwrap();
        assert_eq!(selection.dataset, DatasetName::Wine);
        assert_eq!(selection.model, ModelKind::ExtraTrees);
        assert_eq!(selection.hyperparameters, Hyperparameters::new(50, 3).unwrap());
        assert!(selection.show_test_data);
        assert!(!selection.show_distributions);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            Selection::from_query(&query(&[("max_depth", "deep")])),
            Err(DashboardError::InvalidSelection { field: "max_depth", .. })
        ));
        assert!(matches!(
            Selection::from_query(&query(&[("n_estimators", "101")])),
            Err(DashboardError::InvalidHyperparameter { name: "n_estimators", .. })
        ));
        assert!(matches!(
            Selection::from_query(&query(&[("dataset", "digits")])),
            Err(DashboardError::Data { .. })
        ));
    }
}
