//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /health
///
/// Returns 200 with `{"status": "ok"}` when the service and its database
/// connection are healthy.
pub async fn health(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    keydesk_db::health_check(&state.pool).await?;
    Ok(Json(json!({ "status": "ok" })))
}
