//! HTTP surface: the dashboard page, its JSON twin and a health check.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use maud::Markup;
use serde_json::json;
use tracing::{info, warn};

use crate::DashboardError;
use crate::error::ApiError;
use crate::page::render_page;
use crate::pipeline::{DashboardQuery, DashboardView, Selection, Session, run_dashboard};

/// State shared by every request.
#[derive(Debug)]
pub struct AppState {
    pub session: Session,
}

impl AppState {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

/// Build the router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/evaluation", get(evaluation))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind `addr` and serve until ctrl+c.
///
/// # Errors
///
/// Returns the I/O error from binding or accepting connections.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "dashboard listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received, stopping server"),
        Err(err) => {
            warn!(error = %err, "cannot listen for ctrl+c, running until killed");
            std::future::pending::<()>().await;
        }
    }
}

/// Run the pipeline on the blocking pool and hand the view to `finish` there.
async fn run_blocking<T, F>(state: Arc<AppState>, selection: Selection, finish: F) -> Result<T, DashboardError>
where
    T: Send + 'static,
    F: FnOnce(&Session, DashboardView) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || -> Result<T, DashboardError> {
        let view = run_dashboard(&state.session, &selection)?;
        Ok(finish(&state.session, view))
    })
    .await?
}

async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Markup, DashboardError> {
    let selection = Selection::from_query(&query)?;
    run_blocking(state, selection, move |session, view| {
        render_page(&selection, &view, session.config())
    })
    .await
}

async fn evaluation(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, ApiError> {
    let selection = Selection::from_query(&query)?;
    let response = run_blocking(state, selection, |_, view| Json(view.summary()).into_response()).await?;
    Ok(response)
}

/// Cache counts come from atomics and never wait on a running fit.
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let session = &state.session;
    Json(json!({
        "status": "ok",
        "datasets_cached": session.provider().cache().len(),
        "models_cached": session.trainer().cache().len(),
    }))
}
