//! Handlers for the processor list and per-processor entries.
//!
//! Every mutation locks the session, applies one input event and publishes
//! the resulting [`SessionChange`] before releasing the lock, so events leave
//! in commit order.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use vectorflow_core::entry::{Entry, EntryUpdate};
use vectorflow_core::processor::{MlInferenceUpdate, ProcessorKindTag};
use vectorflow_core::session::{EditorSession, SessionChange};
use vectorflow_core::types::ProcessorId;

use super::{parse_processor_id, ChangeResponse, SessionView};
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddProcessorRequest {
    pub kind: ProcessorKindTag,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<ProcessorId>,
}

/// Publish `change` and describe the session after it.
pub(crate) fn committed<T: serde::Serialize>(
    state: &AppState,
    session: &EditorSession,
    change: SessionChange,
    detail: Option<T>,
) -> ChangeResponse<T> {
    let revision = state.publish(&change);
    ChangeResponse {
        change,
        detail,
        view: SessionView {
            revision,
            snapshot: session.snapshot(),
        },
    }
}

// ---------------------------------------------------------------------------
// Processors
// ---------------------------------------------------------------------------

/// GET /api/v1/pipeline
pub async fn get_pipeline(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let session = state.session.lock().await;
    let view = SessionView {
        revision: state.current_revision(),
        snapshot: session.snapshot(),
    };
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/pipeline/processors
///
/// Appends a processor of the requested kind with its default configuration.
pub async fn add_processor(
    State(state): State<AppState>,
    Json(input): Json<AddProcessorRequest>,
) -> AppResult<impl IntoResponse> {
    let mut session = state.session.lock().await;
    let change = session.add_processor(input.kind)?;

    tracing::info!(kind = %input.kind, event = change.event_type(), "Processor added");

    let body = committed::<()>(&state, &session, change, None);
    Ok((StatusCode::CREATED, Json(DataResponse { data: body })))
}

/// DELETE /api/v1/pipeline/processors/{id}
pub async fn remove_processor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_processor_id(&id)?;
    let mut session = state.session.lock().await;
    let change = session.remove_processor(id)?;

    tracing::info!(processor_id = %id, "Processor removed");

    let body = committed::<()>(&state, &session, change, None);
    Ok(Json(DataResponse { data: body }))
}

/// PUT /api/v1/pipeline/processors/{id}/ml-inference
///
/// Body is one scalar edit, e.g. `{"field": "model_id", "value": "m-1"}`.
pub async fn update_ml_inference(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<MlInferenceUpdate>,
) -> AppResult<impl IntoResponse> {
    let id = parse_processor_id(&id)?;
    let mut session = state.session.lock().await;
    let change = session.update_ml_inference(id, update)?;

    tracing::debug!(processor_id = %id, "ML inference processor updated");

    let body = committed::<()>(&state, &session, change, None);
    Ok(Json(DataResponse { data: body }))
}

/// PUT /api/v1/pipeline/order
///
/// The body must list every current processor id exactly once.
pub async fn reorder(
    State(state): State<AppState>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<impl IntoResponse> {
    let mut session = state.session.lock().await;
    let change = session.reorder(&input.order)?;

    tracing::info!(len = input.order.len(), "Pipeline reordered");

    let body = committed::<()>(&state, &session, change, None);
    Ok(Json(DataResponse { data: body }))
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// POST /api/v1/pipeline/processors/{id}/entries
pub async fn add_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_processor_id(&id)?;
    let mut session = state.session.lock().await;
    let change = session.add_entry(id)?;

    tracing::debug!(processor_id = %id, "Entry added");

    let body = committed::<()>(&state, &session, change, None);
    Ok((StatusCode::CREATED, Json(DataResponse { data: body })))
}

/// PUT /api/v1/pipeline/processors/{id}/entries/{index}
///
/// Body is one field edit, e.g. `{"field": "to_key", "value": "title"}`.
pub async fn update_entry(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, usize)>,
    Json(update): Json<EntryUpdate>,
) -> AppResult<impl IntoResponse> {
    let id = parse_processor_id(&id)?;
    let mut session = state.session.lock().await;
    let change = session.update_entry(id, index, update)?;

    tracing::debug!(processor_id = %id, index, "Entry updated");

    let body = committed::<()>(&state, &session, change, None);
    Ok(Json(DataResponse { data: body }))
}

/// DELETE /api/v1/pipeline/processors/{id}/entries/{index}
///
/// The removed entry is returned under `detail`.
pub async fn remove_entry(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, usize)>,
) -> AppResult<impl IntoResponse> {
    let id = parse_processor_id(&id)?;
    let mut session = state.session.lock().await;
    let (removed, change) = session.remove_entry(id, index)?;

    tracing::debug!(processor_id = %id, index, "Entry removed");

    let body = committed::<Entry>(&state, &session, change, Some(removed));
    Ok(Json(DataResponse { data: body }))
}
