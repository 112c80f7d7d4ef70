//! Transactional orchestration of the key lifecycle.
//!
//! [`LifecycleEngine`] owns every mutation of request and room state. Each
//! operation is one database transaction: lock the rows involved, validate
//! the transition with `keydesk_core::lifecycle`, apply the writes, commit.
//! Row locks serialize racing calls on the same holder or room without
//! blocking unrelated entities; the partial unique index on active requests
//! backs the single-active-key rule against any race that slips past the
//! locks.
//!
//! Lock ordering is request rows before room rows in every operation, so
//! concurrent operations cannot deadlock.
//!
//! Events are published only after the transaction commits; a publish or
//! delivery failure can never roll a transition back.

use std::sync::Arc;

use keydesk_core::error::CoreError;
use keydesk_core::lifecycle::{self, LifecycleError, Transition};
use keydesk_core::status::{RequestStatus, ReturnStatus, RoomStatus, StatusId};
use keydesk_core::types::DbId;
use keydesk_db::models::request::{CreateKeyRequest, KeyRequest};
use keydesk_db::models::room::Room;
use keydesk_db::repositories::{RequestRepo, RoomRepo, UserRepo};
use keydesk_db::DbPool;
use keydesk_events::bus::{
    EVENT_REQUEST_APPROVED, EVENT_REQUEST_CREATED, EVENT_REQUEST_REJECTED, EVENT_RETURN_APPROVED,
    EVENT_RETURN_REJECTED, EVENT_RETURN_REQUESTED,
};
use keydesk_events::{EventBus, KeyEvent};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Applies all key lifecycle operations atomically.
pub struct LifecycleEngine {
    pool: DbPool,
    event_bus: Arc<EventBus>,
}

impl LifecycleEngine {
    /// Create an engine over the given pool and event bus.
    pub fn new(pool: DbPool, event_bus: Arc<EventBus>) -> Self {
        Self { pool, event_bus }
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    /// Create a new key request for a room.
    ///
    /// Administrators may file on behalf of another member by setting
    /// `holder_id`; everyone else is their own holder. Field validation
    /// runs before any state is read.
    pub async fn create_request(
        &self,
        caller: &AuthUser,
        input: &CreateKeyRequest,
    ) -> AppResult<KeyRequest> {
        lifecycle::validate_new_request(&input.carried_items, &input.contact_phone)?;

        let (holder_id, on_behalf) = match input.holder_id {
            Some(holder_id) if holder_id != caller.user_id => {
                if !caller.is_admin() {
                    return Err(AppError::Core(CoreError::Forbidden(
                        "Only administrators may file a request on behalf of another member"
                            .into(),
                    )));
                }
                let holder = UserRepo::find_by_id(&self.pool, holder_id)
                    .await?
                    .ok_or(AppError::Core(CoreError::NotFound {
                        entity: "User",
                        id: holder_id,
                    }))?;
                (holder.id, true)
            }
            _ => (caller.user_id, false),
        };

        let mut tx = self.pool.begin().await?;

        // Lock ordering: request rows first, then the room row.
        let active = RequestRepo::find_active_by_holder_for_update(&mut tx, holder_id).await?;

        let room = RoomRepo::find_by_id_for_update(&mut tx, input.room_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Room",
                id: input.room_id,
            }))?;
        let room_status = decode_room_status(&room)?;

        let transition = lifecycle::authorize_new_request(
            room_status,
            room.is_private,
            caller.is_admin(),
            active.is_some(),
        )?;

        let request =
            RequestRepo::insert(&mut tx, holder_id, caller.user_id, on_behalf, input).await?;
        RoomRepo::set_status(&mut tx, room.id, transition.room_status.id()).await?;

        tx.commit().await?;

        tracing::info!(
            request_id = request.id,
            room_id = room.id,
            holder_id,
            on_behalf,
            created_by = caller.user_id,
            "Key request created",
        );
        self.publish(EVENT_REQUEST_CREATED, &request, caller);

        Ok(request)
    }

    // -----------------------------------------------------------------------
    // Administrative approval
    // -----------------------------------------------------------------------

    /// Approve a pending request: the holder takes the key.
    pub async fn approve_request(&self, caller: &AuthUser, id: DbId) -> AppResult<KeyRequest> {
        self.transition(caller, id, EVENT_REQUEST_APPROVED, no_authorize, |status, _| {
            lifecycle::approve_request(status)
        })
        .await
    }

    /// Reject a pending request; the room frees immediately.
    pub async fn reject_request(&self, caller: &AuthUser, id: DbId) -> AppResult<KeyRequest> {
        self.transition(caller, id, EVENT_REQUEST_REJECTED, no_authorize, |status, _| {
            lifecycle::reject_request(status)
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Two-phase return
    // -----------------------------------------------------------------------

    /// Signal intent to return the key. Allowed for the holder and for
    /// administrators; the room stays occupied until the return is approved.
    pub async fn request_return(&self, caller: &AuthUser, id: DbId) -> AppResult<KeyRequest> {
        let caller_id = caller.user_id;
        let is_admin = caller.is_admin();
        self.transition(
            caller,
            id,
            EVENT_RETURN_REQUESTED,
            move |request: &KeyRequest| {
                if request.holder_id != caller_id && !is_admin {
                    return Err(AppError::Core(CoreError::Forbidden(
                        "Only the holder may return this key".into(),
                    )));
                }
                Ok(())
            },
            lifecycle::request_return,
        )
        .await
    }

    /// Approve a pending return: the loan completes and the room frees.
    pub async fn approve_return(&self, caller: &AuthUser, id: DbId) -> AppResult<KeyRequest> {
        self.transition(
            caller,
            id,
            EVENT_RETURN_APPROVED,
            no_authorize,
            |_, return_status| lifecycle::approve_return(return_status),
        )
        .await
    }

    /// Reject a pending return: the holder keeps the key and may retry.
    pub async fn reject_return(&self, caller: &AuthUser, id: DbId) -> AppResult<KeyRequest> {
        self.transition(
            caller,
            id,
            EVENT_RETURN_REJECTED,
            no_authorize,
            |_, return_status| lifecycle::reject_return(return_status),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Room administration
    // -----------------------------------------------------------------------

    /// Apply the administrative maintenance override to a room.
    ///
    /// Only `available -> maintenance` and back are accepted; derived
    /// statuses cannot be forced.
    pub async fn set_room_status(
        &self,
        caller: &AuthUser,
        id: DbId,
        status_id: StatusId,
    ) -> AppResult<Room> {
        let to = RoomStatus::from_id(status_id)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown room status id {status_id}")))?;

        let mut tx = self.pool.begin().await?;

        let mut room = RoomRepo::find_by_id_for_update(&mut tx, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Room",
                id,
            }))?;
        let from = decode_room_status(&room)?;

        lifecycle::validate_status_override(from, to)?;
        RoomRepo::set_status(&mut tx, id, to.id()).await?;

        tx.commit().await?;

        tracing::info!(
            room_id = id,
            from = %from,
            to = %to,
            admin_id = caller.user_id,
            "Room status override applied",
        );

        room.status_id = to.id();
        Ok(room)
    }

    /// Soft-delete a room, refusing while any pending or approved request
    /// references it.
    pub async fn delete_room(&self, caller: &AuthUser, id: DbId) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        RoomRepo::find_by_id_for_update(&mut tx, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Room",
                id,
            }))?;

        let active = RequestRepo::count_active_for_room(&mut tx, id).await?;
        lifecycle::validate_room_delete(active)?;

        RoomRepo::soft_delete(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(room_id = id, admin_id = caller.user_id, "Room deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Shared transition plumbing
    // -----------------------------------------------------------------------

    /// Run one request transition as a single transaction.
    ///
    /// Locks the request row, authorizes the caller against it, computes the
    /// transition from the decoded states, locks the room, applies both
    /// writes, commits, then publishes `event_type`.
    async fn transition<A, F>(
        &self,
        caller: &AuthUser,
        request_id: DbId,
        event_type: &'static str,
        authorize: A,
        compute: F,
    ) -> AppResult<KeyRequest>
    where
        A: FnOnce(&KeyRequest) -> AppResult<()>,
        F: FnOnce(RequestStatus, ReturnStatus) -> Result<Transition, LifecycleError>,
    {
        let mut tx = self.pool.begin().await?;

        let request = RequestRepo::find_by_id_for_update(&mut tx, request_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Request",
                id: request_id,
            }))?;

        authorize(&request)?;

        let (status, return_status) = decode_request_states(&request)?;
        let transition = compute(status, return_status)?;

        let room = RoomRepo::find_by_id_for_update(&mut tx, request.room_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Room",
                id: request.room_id,
            }))?;

        let updated = RequestRepo::apply_transition(
            &mut tx,
            request_id,
            transition.status,
            transition.return_status,
        )
        .await?;
        RoomRepo::set_status(&mut tx, room.id, transition.room_status.id()).await?;

        tx.commit().await?;

        tracing::info!(
            request_id,
            room_id = room.id,
            holder_id = updated.holder_id,
            status = %transition.status,
            return_status = %transition.return_status,
            actor_id = caller.user_id,
            "Request transition applied",
        );
        self.publish(event_type, &updated, caller);

        Ok(updated)
    }

    /// Publish a domain event for a committed transition, best-effort.
    fn publish(&self, event_type: &'static str, request: &KeyRequest, caller: &AuthUser) {
        self.event_bus.publish(
            KeyEvent::new(event_type)
                .with_source("request", request.id)
                .with_actor(caller.user_id)
                .with_payload(serde_json::json!({
                    "room_id": request.room_id,
                    "holder_id": request.holder_id,
                })),
        );
    }
}

/// Authorization hook for operations already gated by role extractors.
fn no_authorize(_request: &KeyRequest) -> AppResult<()> {
    Ok(())
}

/// Decode a request row's status columns into the domain enums.
fn decode_request_states(request: &KeyRequest) -> AppResult<(RequestStatus, ReturnStatus)> {
    let status = RequestStatus::from_id(request.status_id).ok_or_else(|| {
        AppError::InternalError(format!("Unknown request status id {}", request.status_id))
    })?;
    let return_status = ReturnStatus::from_id(request.return_status_id).ok_or_else(|| {
        AppError::InternalError(format!(
            "Unknown return status id {}",
            request.return_status_id
        ))
    })?;
    Ok((status, return_status))
}

/// Decode a room row's status column into the domain enum.
fn decode_room_status(room: &Room) -> AppResult<RoomStatus> {
    RoomStatus::from_id(room.status_id)
        .ok_or_else(|| AppError::InternalError(format!("Unknown room status id {}", room.status_id)))
}
