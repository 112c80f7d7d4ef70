//! Repository for the `rooms` table.
//!
//! Room `status_id` is only written through the transaction helpers; the
//! lifecycle engine derives the value from the request ledger and this
//! layer never second-guesses it.

use keydesk_core::status::StatusId;
use keydesk_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::room::{CreateRoom, Room, RoomListQuery, UpdateRoom};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, code, name, status_id, is_private, capacity, equipment, \
    floor, location, coordinator, created_at, updated_at";

/// Maximum page size for room listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for room listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations for rooms.
pub struct RoomRepo;

impl RoomRepo {
    /// Insert a new room, returning the created row.
    ///
    /// New rooms start in status 1 (available).
    pub async fn create(pool: &PgPool, input: &CreateRoom) -> Result<Room, sqlx::Error> {
        let query = format!(
            "INSERT INTO rooms (code, name, is_private, capacity, equipment, floor, location, coordinator)
             VALUES ($1, $2, COALESCE($3, FALSE), $4, COALESCE($5, '{{}}'), $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Room>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(input.is_private)
            .bind(input.capacity)
            .bind(&input.equipment)
            .bind(&input.floor)
            .bind(&input.location)
            .bind(&input.coordinator)
            .fetch_one(pool)
            .await
    }

    /// Find a room by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Room>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rooms WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Room>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock and return a room row inside a transaction.
    ///
    /// Serializes all lifecycle operations touching the same room.
    pub async fn find_by_id_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Room>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM rooms WHERE id = $1 AND deleted_at IS NULL FOR UPDATE");
        sqlx::query_as::<_, Room>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// List rooms with optional status/floor filters and pagination,
    /// ordered by code. Excludes soft-deleted rows.
    pub async fn list(pool: &PgPool, params: &RoomListQuery) -> Result<Vec<Room>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions: Vec<String> = vec!["deleted_at IS NULL".to_string()];
        let mut bind_idx: u32 = 1;

        if params.status_id.is_some() {
            conditions.push(format!("status_id = ${bind_idx}"));
            bind_idx += 1;
        }

        if params.floor.is_some() {
            conditions.push(format!("floor = ${bind_idx}"));
            bind_idx += 1;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM rooms \
             WHERE {} \
             ORDER BY code ASC \
             LIMIT ${bind_idx} OFFSET ${}",
            conditions.join(" AND "),
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Room>(&query);

        if let Some(sid) = params.status_id {
            q = q.bind(sid);
        }
        if let Some(floor) = &params.floor {
            q = q.bind(floor);
        }

        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// Update a room's descriptive fields. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRoom,
    ) -> Result<Option<Room>, sqlx::Error> {
        let query = format!(
            "UPDATE rooms SET
                code = COALESCE($2, code),
                name = COALESCE($3, name),
                is_private = COALESCE($4, is_private),
                capacity = COALESCE($5, capacity),
                equipment = COALESCE($6, equipment),
                floor = COALESCE($7, floor),
                location = COALESCE($8, location),
                coordinator = COALESCE($9, coordinator)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Room>(&query)
            .bind(id)
            .bind(&input.code)
            .bind(&input.name)
            .bind(input.is_private)
            .bind(input.capacity)
            .bind(&input.equipment)
            .bind(&input.floor)
            .bind(&input.location)
            .bind(&input.coordinator)
            .fetch_optional(pool)
            .await
    }

    /// Set a room's status inside an engine transaction.
    pub async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        status_id: StatusId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE rooms SET status_id = $2 WHERE id = $1")
            .bind(id)
            .bind(status_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Soft-delete a room inside an engine transaction.
    /// Returns `true` if a live row was marked deleted.
    pub async fn soft_delete(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE rooms SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(&mut **tx)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
