//! Handlers for the `/requests` resource: the key lifecycle surface.
//!
//! Every response body is a [`RequestView`] projected for the caller, so
//! contact data never leaves the service unredacted. The administrative
//! decisions (approve/reject, return approve/reject) are gated by
//! [`RequireAdmin`]; creating a request and signalling a return are open to
//! any authenticated member, with the engine enforcing the holder checks.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use keydesk_core::error::CoreError;
use keydesk_core::types::DbId;
use keydesk_db::models::request::{CreateKeyRequest, RequestListQuery, RequestView};
use keydesk_db::repositories::RequestRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/requests
///
/// Submit a new key request. Returns 201 with the created request in
/// pending status. Administrators may set `holder_id` to file on a
/// member's behalf.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateKeyRequest>,
) -> AppResult<impl IntoResponse> {
    let request = state.engine.create_request(&auth, &input).await?;
    let view = RequestView::project(&request, auth.user_id, &auth.role);
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// GET /api/v1/requests
///
/// List requests. Admin users see every request; members see only requests
/// they hold or filed. Supports optional `status_id`, `room_id`, `limit`,
/// and `offset` query parameters.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<RequestListQuery>,
) -> AppResult<impl IntoResponse> {
    let scope = if auth.is_admin() {
        None
    } else {
        Some(auth.user_id)
    };
    let requests = RequestRepo::list(&state.pool, scope, &params).await?;

    let views: Vec<RequestView> = requests
        .iter()
        .map(|r| RequestView::project(r, auth.user_id, &auth.role))
        .collect();

    Ok(Json(DataResponse { data: views }))
}

/// GET /api/v1/requests/{id}
///
/// Get a single request, projected for the caller: contact data is
/// redacted unless the caller is an administrator or the holder.
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = RequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Request",
            id,
        }))?;
    let view = RequestView::project(&request, auth.user_id, &auth.role);
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/requests/{id}/approve
///
/// Approve a pending request. Returns 409 `NOT_PENDING` if someone
/// already acted on it.
pub async fn approve(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = state.engine.approve_request(&admin, id).await?;
    let view = RequestView::project(&request, admin.user_id, &admin.role);
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/requests/{id}/reject
///
/// Reject a pending request; the room frees immediately and the holder may
/// file a new request.
pub async fn reject(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = state.engine.reject_request(&admin, id).await?;
    let view = RequestView::project(&request, admin.user_id, &admin.role);
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/requests/{id}/return
///
/// Signal intent to return the key. Only the holder (or an administrator)
/// may call this; the room stays occupied until an administrator approves
/// the return.
pub async fn request_return(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = state.engine.request_return(&auth, id).await?;
    let view = RequestView::project(&request, auth.user_id, &auth.role);
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/requests/{id}/return/approve
///
/// Approve a pending return: the loan completes and the room frees.
pub async fn approve_return(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = state.engine.approve_return(&admin, id).await?;
    let view = RequestView::project(&request, admin.user_id, &admin.role);
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/requests/{id}/return/reject
///
/// Reject a pending return: the holder keeps the key and may signal the
/// return again.
pub async fn reject_return(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = state.engine.reject_return(&admin, id).await?;
    let view = RequestView::project(&request, admin.user_id, &admin.role);
    Ok(Json(DataResponse { data: view }))
}
