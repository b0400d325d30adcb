use axum::routing::get;
use axum::Router;

use crate::handlers::definition;
use crate::state::AppState;

/// Definition routes mounted at `/definition`.
///
/// ```text
/// GET /              -> get_definition
/// GET /settings      -> get_settings
/// PUT /settings      -> update_settings
/// GET /validation    -> get_validation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(definition::get_definition))
        .route(
            "/settings",
            get(definition::get_settings).put(definition::update_settings),
        )
        .route("/validation", get(definition::get_validation))
}
