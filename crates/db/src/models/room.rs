//! Room entity model and DTOs.

use keydesk_core::status::StatusId;
use keydesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A room row from the `rooms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Room {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub status_id: StatusId,
    pub is_private: bool,
    pub capacity: Option<i32>,
    pub equipment: Vec<String>,
    pub floor: Option<String>,
    pub location: Option<String>,
    pub coordinator: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new room.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoom {
    pub code: String,
    pub name: String,
    pub is_private: Option<bool>,
    pub capacity: Option<i32>,
    pub equipment: Option<Vec<String>>,
    pub floor: Option<String>,
    pub location: Option<String>,
    pub coordinator: Option<String>,
}

/// DTO for updating an existing room. All fields are optional; status is
/// not part of this DTO -- it moves only through the lifecycle engine and
/// the maintenance override endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoom {
    pub code: Option<String>,
    pub name: Option<String>,
    pub is_private: Option<bool>,
    pub capacity: Option<i32>,
    pub equipment: Option<Vec<String>>,
    pub floor: Option<String>,
    pub location: Option<String>,
    pub coordinator: Option<String>,
}

/// DTO for the administrative status override endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRoomStatus {
    /// Target status id (see `room_statuses`); only the maintenance
    /// override transitions are accepted.
    pub status_id: StatusId,
}

/// Query parameters for `GET /api/v1/rooms`.
#[derive(Debug, Deserialize)]
pub struct RoomListQuery {
    /// Filter by status ID (e.g. 1 = available, 4 = maintenance).
    pub status_id: Option<StatusId>,
    /// Filter by floor label.
    pub floor: Option<String>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
