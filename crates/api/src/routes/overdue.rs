//! Route definitions for the `/overdue` triage listing.

use axum::routing::get;
use axum::Router;

use crate::handlers::overdue;
use crate::state::AppState;

/// Routes mounted at `/overdue`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(overdue::list))
}
