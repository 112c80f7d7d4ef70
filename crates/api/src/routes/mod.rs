//! Route tree definitions.

pub mod health;
pub mod overdue;
pub mod requests;
pub mod rooms;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /rooms                              list (auth), create (admin)
/// /rooms/{id}                         get (auth), update, delete (admin)
/// /rooms/{id}/status                  maintenance override (PUT, admin)
///
/// /requests                           list (auth, role-scoped), create (auth)
/// /requests/{id}                      get (auth, visibility-projected)
/// /requests/{id}/approve              approve request (POST, admin)
/// /requests/{id}/reject               reject request (POST, admin)
/// /requests/{id}/return               signal return intent (POST, holder/admin)
/// /requests/{id}/return/approve       approve return (POST, admin)
/// /requests/{id}/return/reject        reject return (POST, admin)
///
/// /overdue                            overdue triage listing (GET, admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Room registry.
        .nest("/rooms", rooms::router())
        // Key request lifecycle.
        .nest("/requests", requests::router())
        // Overdue monitor.
        .nest("/overdue", overdue::router())
}
