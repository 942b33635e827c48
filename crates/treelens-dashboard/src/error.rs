//! Dashboard errors and their HTTP rendering.

use std::error::Error as _;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use treelens_data::DataError;
use treelens_eval::EvalError;
use treelens_rf::RfError;

use crate::model::ModelKind;
use crate::page::render_error;

/// Errors from one dashboard run.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Returned when a hyperparameter is outside its slider range.
    #[error("{name} must be in [{min}, {max}], got {value}")]
    InvalidHyperparameter {
        /// Hyperparameter name.
        name: &'static str,
        /// The rejected value.
        value: usize,
        /// Smallest allowed value.
        min: usize,
        /// Largest allowed value.
        max: usize,
    },

    /// Returned when a query parameter cannot be parsed.
    #[error("invalid value \"{value}\" for {field}")]
    InvalidSelection {
        /// Query parameter name.
        field: &'static str,
        /// The raw value.
        value: String,
    },

    /// Returned when loading or splitting a dataset fails.
    #[error("failed to load dataset")]
    Data {
        /// Underlying dataset error.
        #[from]
        source: DataError,
    },

    /// Returned when fitting an estimator fails.
    #[error("failed to train {model}")]
    Training {
        /// Model being trained.
        model: ModelKind,
        /// Underlying estimator error.
        source: RfError,
    },

    /// Returned when predicting on the test set fails.
    #[error("prediction with {model} failed")]
    Prediction {
        /// Model used.
        model: ModelKind,
        /// Underlying estimator error.
        source: RfError,
    },

    /// Returned when computing metrics fails.
    #[error("failed to evaluate predictions")]
    Evaluation {
        /// Underlying metric error.
        #[from]
        source: EvalError,
    },

    /// Returned when the blocking pipeline task panics or is cancelled.
    #[error("dashboard task did not complete")]
    TaskFailed {
        /// Underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },
}

impl DashboardError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::InvalidHyperparameter { .. } | DashboardError::InvalidSelection { .. } => {
                StatusCode::BAD_REQUEST
            }
            DashboardError::Data {
                source: DataError::UnknownDataset { .. },
            } => StatusCode::BAD_REQUEST,
            DashboardError::Data {
                source: DataError::Download { .. },
            } => StatusCode::BAD_GATEWAY,
            DashboardError::Evaluation {
                source: EvalError::SingleClass { .. },
            } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message followed by every underlying cause, joined by ": ".
    #[must_use]
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut cause = self.source();
        while let Some(err) = cause {
            message.push_str(": ");
            message.push_str(&err.to_string());
            cause = err.source();
        }
        message
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.chain(), "dashboard run failed");
        } else {
            tracing::warn!(error = %self.chain(), "rejected dashboard request");
        }
        (status, render_error(status, &self.chain())).into_response()
    }
}

/// [`DashboardError`] rendered as JSON for the API routes.
#[derive(Debug)]
pub struct ApiError(pub DashboardError);

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let body = Json(json!({
            "error": true,
            "message": self.0.chain(),
        }));
        (status, body).into_response()
    }
}
