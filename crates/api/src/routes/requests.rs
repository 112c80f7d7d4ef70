//! Route definitions for the `/requests` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::requests;
use crate::state::AppState;

/// Routes mounted at `/requests`.
///
/// ```text
/// GET    /                      -> list
/// POST   /                      -> create
/// GET    /{id}                  -> get_by_id
/// POST   /{id}/approve          -> approve
/// POST   /{id}/reject           -> reject
/// POST   /{id}/return           -> request_return
/// POST   /{id}/return/approve   -> approve_return
/// POST   /{id}/return/reject    -> reject_return
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(requests::list).post(requests::create))
        .route("/{id}", get(requests::get_by_id))
        .route("/{id}/approve", post(requests::approve))
        .route("/{id}/reject", post(requests::reject))
        .route("/{id}/return", post(requests::request_return))
        .route("/{id}/return/approve", post(requests::approve_return))
        .route("/{id}/return/reject", post(requests::reject_return))
}
