pub mod definition;
pub mod events;
pub mod health;
pub mod pipeline;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /pipeline                                         snapshot (GET)
/// /pipeline/processors                              add (POST)
/// /pipeline/processors/{id}                         remove (DELETE)
/// /pipeline/processors/{id}/ml-inference            scalar setter (PUT)
/// /pipeline/processors/{id}/entries                 add entry (POST)
/// /pipeline/processors/{id}/entries/{index}         update (PUT), remove (DELETE)
/// /pipeline/order                                   reorder (PUT)
/// /pipeline/drag                                    drag state (GET)
/// /pipeline/drag/start                              begin gesture (POST)
/// /pipeline/drag/over                               preview (POST)
/// /pipeline/drag/drop                               commit (POST)
/// /pipeline/drag/end                                cancel (POST)
///
/// /definition                                       rendered document (GET, ?format=json|yaml)
/// /definition/settings                              settings (GET, PUT)
/// /definition/validation                            validation report (GET)
///
/// /events                                           recent events (GET, ?limit=)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/pipeline", pipeline::router())
        .nest("/definition", definition::router())
        .nest("/events", events::router())
}
