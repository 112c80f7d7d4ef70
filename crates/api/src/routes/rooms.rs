//! Route definitions for the `/rooms` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::rooms;
use crate::state::AppState;

/// Routes mounted at `/rooms`.
///
/// ```text
/// GET    /            -> list
/// POST   /            -> create
/// GET    /{id}        -> get_by_id
/// PUT    /{id}        -> update
/// DELETE /{id}        -> delete
/// PUT    /{id}/status -> set_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rooms::list).post(rooms::create))
        .route(
            "/{id}",
            get(rooms::get_by_id)
                .put(rooms::update)
                .delete(rooms::delete),
        )
        .route("/{id}/status", put(rooms::set_status))
}
