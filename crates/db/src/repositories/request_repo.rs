//! Repository for the `requests` table -- the key-loan ledger.
//!
//! Uses the status enums from `keydesk_core::status` for every transition;
//! no magic numbers. Rows are never deleted. Transition writes run inside
//! engine transactions after the affected rows were locked and validated;
//! timestamps that must be set exactly once use `COALESCE(col, NOW())`.

use keydesk_core::status::{RequestStatus, ReturnStatus};
use keydesk_core::types::{DbId, Timestamp};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::request::{
    CreateKeyRequest, KeyRequest, OverdueKeyRequest, RequestListQuery,
};

/// Column list for `requests` queries.
const COLUMNS: &str = "\
    id, room_id, holder_id, created_by, on_behalf, carried_items, contact_phone, \
    status_id, return_status_id, \
    requested_at, return_requested_at, returned_at, escalated_at, \
    created_at, updated_at";

/// Maximum page size for request listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for request listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides ledger operations for key requests.
pub struct RequestRepo;

impl RequestRepo {
    /// Insert a new pending request inside an engine transaction.
    ///
    /// `requested_at` is stamped by the database; the partial unique index
    /// `uq_requests_active_holder` rejects a second active request for the
    /// same holder that slipped past the engine's row lock.
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        holder_id: DbId,
        created_by: DbId,
        on_behalf: bool,
        input: &CreateKeyRequest,
    ) -> Result<KeyRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO requests \
                 (room_id, holder_id, created_by, on_behalf, carried_items, contact_phone, \
                  status_id, return_status_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, KeyRequest>(&query)
            .bind(input.room_id)
            .bind(holder_id)
            .bind(created_by)
            .bind(on_behalf)
            .bind(&input.carried_items)
            .bind(&input.contact_phone)
            .bind(RequestStatus::Pending.id())
            .bind(ReturnStatus::None.id())
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a request by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<KeyRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM requests WHERE id = $1");
        sqlx::query_as::<_, KeyRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock and return a request row inside a transaction.
    pub async fn find_by_id_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<KeyRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM requests WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, KeyRequest>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Lock and return the holder's active (pending or approved) request,
    /// if any. Serializes concurrent creations for the same holder.
    pub async fn find_active_by_holder_for_update(
        tx: &mut Transaction<'_, Postgres>,
        holder_id: DbId,
    ) -> Result<Option<KeyRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM requests \
             WHERE holder_id = $1 AND status_id IN ($2, $3) \
             FOR UPDATE"
        );
        sqlx::query_as::<_, KeyRequest>(&query)
            .bind(holder_id)
            .bind(RequestStatus::Pending.id())
            .bind(RequestStatus::Approved.id())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Count active (pending or approved) requests against a room.
    /// Used by the room-deletion guard.
    pub async fn count_active_for_room(
        tx: &mut Transaction<'_, Postgres>,
        room_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM requests WHERE room_id = $1 AND status_id IN ($2, $3)",
        )
        .bind(room_id)
        .bind(RequestStatus::Pending.id())
        .bind(RequestStatus::Approved.id())
        .fetch_one(&mut **tx)
        .await
    }

    /// Apply a validated status/return-status transition to a request.
    ///
    /// Timestamp columns are touched only when the transition introduces
    /// them, and only if still unset, so retries and the rejected-return
    /// path never rewind an existing value.
    pub async fn apply_transition(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        status: RequestStatus,
        return_status: ReturnStatus,
    ) -> Result<KeyRequest, sqlx::Error> {
        let set_return_requested = return_status == ReturnStatus::PendingApproval;
        let set_returned = status == RequestStatus::Returned;

        let query = format!(
            "UPDATE requests SET \
                 status_id = $2, \
                 return_status_id = $3, \
                 return_requested_at = CASE WHEN $4 \
                     THEN COALESCE(return_requested_at, NOW()) \
                     ELSE return_requested_at END, \
                 returned_at = CASE WHEN $5 \
                     THEN COALESCE(returned_at, NOW()) \
                     ELSE returned_at END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, KeyRequest>(&query)
            .bind(id)
            .bind(status.id())
            .bind(return_status.id())
            .bind(set_return_requested)
            .bind(set_returned)
            .fetch_one(&mut **tx)
            .await
    }

    /// List requests with optional filters and pagination, newest first.
    /// When `holder_id` is `Some`, restricts to requests the user holds or
    /// filed; when `None`, returns all requests (admin view).
    pub async fn list(
        pool: &PgPool,
        holder_id: Option<DbId>,
        params: &RequestListQuery,
    ) -> Result<Vec<KeyRequest>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if holder_id.is_some() {
            conditions.push(format!(
                "(holder_id = ${bind_idx} OR created_by = ${bind_idx})"
            ));
            bind_idx += 1;
        }

        if params.status_id.is_some() {
            conditions.push(format!("status_id = ${bind_idx}"));
            bind_idx += 1;
        }

        if params.room_id.is_some() {
            conditions.push(format!("room_id = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM requests \
             {where_clause} \
             ORDER BY requested_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, KeyRequest>(&query);

        if let Some(hid) = holder_id {
            q = q.bind(hid);
        }
        if let Some(sid) = params.status_id {
            q = q.bind(sid);
        }
        if let Some(rid) = params.room_id {
            q = q.bind(rid);
        }

        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// List overdue requests: approved, no return awaiting approval, and
    /// requested at or before `cutoff`. Ordered most overdue first -- the
    /// triage ordering the admin console depends on.
    pub async fn list_overdue(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<Vec<OverdueKeyRequest>, sqlx::Error> {
        sqlx::query_as::<_, OverdueKeyRequest>(
            "SELECT r.id, r.room_id, rm.code AS room_code, rm.name AS room_name, \
                    r.holder_id, u.name AS holder_name, r.contact_phone, \
                    r.carried_items, r.requested_at, r.escalated_at \
             FROM requests r \
             JOIN rooms rm ON rm.id = r.room_id \
             JOIN users u ON u.id = r.holder_id \
             WHERE r.status_id = $1 \
               AND r.return_status_id <> $2 \
               AND r.requested_at <= $3 \
             ORDER BY r.requested_at ASC",
        )
        .bind(RequestStatus::Approved.id())
        .bind(ReturnStatus::PendingApproval.id())
        .bind(cutoff)
        .fetch_all(pool)
        .await
    }

    /// List requests that crossed the critical threshold but have not been
    /// escalated yet. Consumed by the background escalation scanner.
    pub async fn list_unescalated_critical(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<Vec<KeyRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM requests \
             WHERE status_id = $1 \
               AND return_status_id <> $2 \
               AND requested_at <= $3 \
               AND escalated_at IS NULL \
             ORDER BY requested_at ASC"
        );
        sqlx::query_as::<_, KeyRequest>(&query)
            .bind(RequestStatus::Approved.id())
            .bind(ReturnStatus::PendingApproval.id())
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }

    /// Stamp a request as escalated. Guarded so the scanner notifies at
    /// most once per request, even across restarts or concurrent scans.
    pub async fn mark_escalated(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE requests SET escalated_at = NOW() WHERE id = $1 AND escalated_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
