use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Number of processors in the current session.
    pub processor_count: usize,
    /// Revision of the last published change.
    pub revision: u64,
    /// Live receivers on the event bus. Zero means the history recorder stopped.
    pub event_subscribers: usize,
}

/// GET /health -- returns service status and a session summary.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let processor_count = state.session.lock().await.pipeline().len();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        processor_count,
        revision: state.current_revision(),
        event_subscribers: state.event_bus.subscriber_count(),
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
