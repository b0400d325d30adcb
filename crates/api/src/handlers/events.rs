use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_EVENT_LIMIT: usize = 50;
const MAX_EVENT_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub struct EventParams {
    pub limit: Option<usize>,
}

/// GET /api/v1/events?limit=
///
/// Recent published changes, oldest first.
pub async fn list_recent_events(
    State(state): State<AppState>,
    Query(params): Query<EventParams>,
) -> AppResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_EVENT_LIMIT);
    if limit == 0 || limit > MAX_EVENT_LIMIT {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_EVENT_LIMIT}"
        )));
    }

    let events = state.history.recent(limit).await;
    Ok(Json(DataResponse { data: events }))
}
