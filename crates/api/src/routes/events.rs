use axum::routing::get;
use axum::Router;

use crate::handlers::events;
use crate::state::AppState;

/// Event history routes mounted at `/events`.
///
/// ```text
/// GET / -> list_recent_events
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(events::list_recent_events))
}
