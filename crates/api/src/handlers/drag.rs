//! Handlers for the drag-to-reorder gesture.
//!
//! `over` is advisory and never publishes. `drop` commits at most one
//! reorder and always leaves the gesture idle.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use vectorflow_core::drag::DropOutcome;
use vectorflow_core::types::ProcessorId;

use super::pipeline::committed;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DragStartRequest {
    pub processor_id: ProcessorId,
}

#[derive(Debug, Deserialize)]
pub struct DragTargetRequest {
    pub target_id: ProcessorId,
}

/// GET /api/v1/pipeline/drag
pub async fn get_drag_state(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let drag = state.session.lock().await.drag_state();
    Ok(Json(DataResponse { data: drag }))
}

/// POST /api/v1/pipeline/drag/start
pub async fn drag_start(
    State(state): State<AppState>,
    Json(input): Json<DragStartRequest>,
) -> AppResult<impl IntoResponse> {
    let mut session = state.session.lock().await;
    let change = session.drag_start(input.processor_id)?;

    tracing::debug!(processor_id = %input.processor_id, "Drag started");

    let body = committed::<()>(&state, &session, change, None);
    Ok(Json(DataResponse { data: body }))
}

/// POST /api/v1/pipeline/drag/over
///
/// Returns the would-be order for a drop on `target_id`, or `null` when no
/// gesture is active or the target is unknown.
pub async fn drag_over(
    State(state): State<AppState>,
    Json(input): Json<DragTargetRequest>,
) -> AppResult<impl IntoResponse> {
    let preview = state.session.lock().await.drag_over(input.target_id);
    Ok(Json(DataResponse { data: preview }))
}

/// POST /api/v1/pipeline/drag/drop
///
/// The resolved [`DropOutcome`] is returned under `detail`.
pub async fn drop_on(
    State(state): State<AppState>,
    Json(input): Json<DragTargetRequest>,
) -> AppResult<impl IntoResponse> {
    let mut session = state.session.lock().await;
    let (outcome, change) = session.drop_on(input.target_id)?;

    match &outcome {
        DropOutcome::Moved { dragged_id, .. } => {
            tracing::info!(
                dragged_id = %dragged_id,
                target_id = %input.target_id,
                "Processor moved by drag"
            );
        }
        DropOutcome::Ignored { reason } => {
            tracing::debug!(target_id = %input.target_id, ?reason, "Drop ignored");
        }
    }

    let body = committed(&state, &session, change, Some(outcome));
    Ok(Json(DataResponse { data: body }))
}

/// POST /api/v1/pipeline/drag/end
pub async fn drag_end(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut session = state.session.lock().await;
    let change = session.drag_end();

    let body = committed::<()>(&state, &session, change, None);
    Ok(Json(DataResponse { data: body }))
}
