//! Handlers for the `/rooms` resource.
//!
//! Room CRUD and the maintenance override are admin-only; reading rooms
//! requires any authenticated caller. Room status is never taken from a
//! client payload except through the override endpoint, which the engine
//! restricts to the maintenance transitions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use keydesk_core::error::CoreError;
use keydesk_core::types::DbId;
use keydesk_db::models::room::{CreateRoom, RoomListQuery, SetRoomStatus, UpdateRoom};
use keydesk_db::repositories::RoomRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/rooms
///
/// Create a new room. Returns 201 with the created row; new rooms start
/// available.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateRoom>,
) -> AppResult<impl IntoResponse> {
    let room = RoomRepo::create(&state.pool, &input).await?;

    tracing::info!(
        room_id = room.id,
        code = %room.code,
        admin_id = admin.user_id,
        "Room created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: room })))
}

/// GET /api/v1/rooms
///
/// List rooms with optional `status_id`, `floor`, `limit`, and `offset`
/// query parameters.
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<RoomListQuery>,
) -> AppResult<impl IntoResponse> {
    let rooms = RoomRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: rooms }))
}

/// GET /api/v1/rooms/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let room = RoomRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Room", id }))?;
    Ok(Json(DataResponse { data: room }))
}

/// PUT /api/v1/rooms/{id}
///
/// Update a room's descriptive fields. Status is not part of this payload.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRoom>,
) -> AppResult<impl IntoResponse> {
    let room = RoomRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Room", id }))?;

    tracing::info!(room_id = id, admin_id = admin.user_id, "Room updated");

    Ok(Json(DataResponse { data: room }))
}

/// DELETE /api/v1/rooms/{id}
///
/// Soft-delete a room. Returns 204 on success, 409 `ROOM_IN_USE` while any
/// pending or approved request references it.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.engine.delete_room(&admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/rooms/{id}/status
///
/// Administrative maintenance override. Any target other than the
/// available/maintenance pair is rejected with 409 `INVALID_TRANSITION`.
pub async fn set_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetRoomStatus>,
) -> AppResult<impl IntoResponse> {
    let room = state
        .engine
        .set_room_status(&admin, id, input.status_id)
        .await?;
    Ok(Json(DataResponse { data: room }))
}
