//! Interactive exploration of tree classifiers.
//!
//! A [`Session`] owns the dataset cache and the model cache. Each request
//! parses a [`Selection`] from the form, runs [`run_dashboard`] (load, train,
//! predict, evaluate) and renders the result with [`render_page`]. The axum
//! router in [`server`] serves the page, a JSON view of the same run and a
//! health check.

mod charts;
mod config;
mod error;
mod model;
mod page;
mod pipeline;
pub mod server;
mod trainer;

pub use charts::scatter_matrix;
pub use config::DashboardConfig;
pub use error::{ApiError, DashboardError};
pub use model::{
    Estimator, FittedModel, Hyperparameters, MAX_DEPTH_RANGE, ModelFactory, ModelKind, ModelSummary,
    N_ESTIMATORS_RANGE,
};
pub use page::{render_error, render_page};
pub use pipeline::{DashboardQuery, DashboardView, RunSummary, Selection, Session, run_dashboard};
pub use server::{AppState, create_router, serve};
pub use trainer::{TrainKey, TrainOutcome, Trainer};
