//! Route definitions for the processor pipeline and its drag gesture.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{drag, pipeline};
use crate::state::AppState;

/// Pipeline routes mounted at `/pipeline`.
///
/// ```text
/// GET    /                                   -> get_pipeline
/// POST   /processors                         -> add_processor
/// DELETE /processors/{id}                    -> remove_processor
/// PUT    /processors/{id}/ml-inference       -> update_ml_inference
/// POST   /processors/{id}/entries            -> add_entry
/// PUT    /processors/{id}/entries/{index}    -> update_entry
/// DELETE /processors/{id}/entries/{index}    -> remove_entry
/// PUT    /order                              -> reorder
/// GET    /drag                               -> get_drag_state
/// POST   /drag/start|over|drop|end           -> drag gesture
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pipeline::get_pipeline))
        .route("/processors", post(pipeline::add_processor))
        .route("/processors/{id}", delete(pipeline::remove_processor))
        .route(
            "/processors/{id}/ml-inference",
            put(pipeline::update_ml_inference),
        )
        .route("/processors/{id}/entries", post(pipeline::add_entry))
        .route(
            "/processors/{id}/entries/{index}",
            put(pipeline::update_entry).delete(pipeline::remove_entry),
        )
        .route("/order", put(pipeline::reorder))
        .route("/drag", get(drag::get_drag_state))
        .route("/drag/start", post(drag::drag_start))
        .route("/drag/over", post(drag::drag_over))
        .route("/drag/drop", post(drag::drop_on))
        .route("/drag/end", post(drag::drag_end))
}
