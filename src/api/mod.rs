//! REST API over the BOS scenario pipeline.
//!
//! - `POST /bos` runs one scenario with the posted overrides
//! - `GET /scenarios` lists the batch outcomes
//! - `GET /scenarios/{id}` returns one batch outcome

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::bos::{BosRunner, ScenarioContext, ScenarioReport};

pub use types::ErrorResponse;

/// Application state shared across all request handlers.
///
/// Built once after the batch completes; read-only afterwards.
pub struct AppState {
    /// Runner used for `POST /bos`.
    pub runner: BosRunner,
    /// Project the posted overrides are applied to.
    pub template: Option<ScenarioContext>,
    /// Outcomes of the batch run.
    pub reports: Vec<ScenarioReport>,
}

impl AppState {
    pub fn new(
        runner: BosRunner,
        template: Option<ScenarioContext>,
        reports: Vec<ScenarioReport>,
    ) -> Self {
        Self {
            runner,
            template,
            reports,
        }
    }
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/bos", post(handlers::post_bos))
        .route("/scenarios", get(handlers::list_scenarios))
        .route("/scenarios/{id}", get(handlers::get_scenario))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
