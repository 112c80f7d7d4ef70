//! Transition rules for the key request lifecycle.
//!
//! Every mutation the engine can apply to a request/room pair is expressed
//! here as a total function over the status enums: given the current state,
//! it either returns the [`Transition`] to apply or the [`LifecycleError`]
//! explaining why the operation is not legal right now. The `api` crate's
//! engine calls these inside a database transaction after locking the rows
//! involved, so a returned `Transition` can be written without re-checking.
//!
//! Conflict-class errors (`NotPending`, `NoPendingReturn`, ...) are also what
//! a retried, already-successful call observes; callers treat them as
//! "someone already acted", not as system failures.

use crate::status::{RequestStatus, ReturnStatus, RoomStatus};

/// Failure modes of the lifecycle operations.
///
/// Each variant has a stable machine-readable [`code`](Self::code) suitable
/// for HTTP clients; the `api` crate maps variants to status codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// The room is private and the caller is not an administrator.
    #[error("Room is private; only an administrator may request a key for it")]
    RoomPrivate,

    /// The room is not currently available for a new request.
    #[error("Room is not available (current status: {0})")]
    RoomUnavailable(RoomStatus),

    /// The holder already has a pending or approved request.
    #[error("Holder already has an active key request")]
    ActiveKeyExists,

    /// A required creation field is missing or empty.
    #[error("Required field '{0}' is missing or empty")]
    MissingField(&'static str),

    /// The request is not pending, so it cannot be approved or rejected.
    #[error("Request is not pending (current status: {0})")]
    NotPending(RequestStatus),

    /// The request is not approved, so a return cannot be signalled.
    #[error("Request is not approved (current status: {0})")]
    NotApproved(RequestStatus),

    /// A return is already awaiting approval for this request.
    #[error("A return is already awaiting approval")]
    ReturnAlreadyPending,

    /// No return is awaiting approval for this request.
    #[error("No return is awaiting approval (current return status: {0})")]
    NoPendingReturn(ReturnStatus),

    /// The room still has pending or approved requests against it.
    #[error("Room has active key requests and cannot be deleted")]
    RoomInUse,

    /// The requested administrative status override is not allowed.
    #[error("Invalid room status override: {from} -> {to}")]
    InvalidTransition { from: RoomStatus, to: RoomStatus },
}

impl LifecycleError {
    /// Stable error code returned to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            LifecycleError::RoomPrivate => "ROOM_PRIVATE",
            LifecycleError::RoomUnavailable(_) => "ROOM_UNAVAILABLE",
            LifecycleError::ActiveKeyExists => "ACTIVE_KEY_EXISTS",
            LifecycleError::MissingField(_) => "MISSING_FIELD",
            LifecycleError::NotPending(_) => "NOT_PENDING",
            LifecycleError::NotApproved(_) => "NOT_APPROVED",
            LifecycleError::ReturnAlreadyPending => "RETURN_ALREADY_PENDING",
            LifecycleError::NoPendingReturn(_) => "NO_PENDING_RETURN",
            LifecycleError::RoomInUse => "ROOM_IN_USE",
            LifecycleError::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }
}

/// The state to write after a successful lifecycle operation.
///
/// `room_status` is the derived room state implied by the new request state,
/// keeping room and ledger consistent by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub status: RequestStatus,
    pub return_status: ReturnStatus,
    pub room_status: RoomStatus,
}

/// Validate the creation fields of a new request.
///
/// Runs before any state is read: a request with no carried-items note or
/// no contact phone is rejected outright.
pub fn validate_new_request(carried_items: &str, contact_phone: &str) -> Result<(), LifecycleError> {
    if carried_items.trim().is_empty() {
        return Err(LifecycleError::MissingField("carried_items"));
    }
    if contact_phone.trim().is_empty() {
        return Err(LifecycleError::MissingField("contact_phone"));
    }
    Ok(())
}

/// Authorize a new request against the current room and holder state.
///
/// Checked in order: private-room access, room availability, then the
/// single-active-key rule for the holder.
pub fn authorize_new_request(
    room_status: RoomStatus,
    room_is_private: bool,
    caller_is_admin: bool,
    holder_has_active: bool,
) -> Result<Transition, LifecycleError> {
    if room_is_private && !caller_is_admin {
        return Err(LifecycleError::RoomPrivate);
    }
    if room_status != RoomStatus::Available {
        return Err(LifecycleError::RoomUnavailable(room_status));
    }
    if holder_has_active {
        return Err(LifecycleError::ActiveKeyExists);
    }
    Ok(Transition {
        status: RequestStatus::Pending,
        return_status: ReturnStatus::None,
        room_status: RoomStatus::Requested,
    })
}

/// Approve a pending request: the holder takes the key, the room is occupied.
pub fn approve_request(status: RequestStatus) -> Result<Transition, LifecycleError> {
    match status {
        RequestStatus::Pending => Ok(Transition {
            status: RequestStatus::Approved,
            return_status: ReturnStatus::None,
            room_status: RoomStatus::Occupied,
        }),
        other => Err(LifecycleError::NotPending(other)),
    }
}

/// Reject a pending request. The rejection is terminal and frees the room;
/// the holder may immediately submit a new request.
pub fn reject_request(status: RequestStatus) -> Result<Transition, LifecycleError> {
    match status {
        RequestStatus::Pending => Ok(Transition {
            status: RequestStatus::Rejected,
            return_status: ReturnStatus::None,
            room_status: RoomStatus::Available,
        }),
        other => Err(LifecycleError::NotPending(other)),
    }
}

/// Signal intent to return the key.
///
/// Only legal on an approved request with no return already awaiting
/// approval. A previously rejected return may be retried through here.
/// The room stays occupied; it only frees on final return approval.
pub fn request_return(
    status: RequestStatus,
    return_status: ReturnStatus,
) -> Result<Transition, LifecycleError> {
    if status != RequestStatus::Approved {
        return Err(LifecycleError::NotApproved(status));
    }
    if return_status == ReturnStatus::PendingApproval {
        return Err(LifecycleError::ReturnAlreadyPending);
    }
    Ok(Transition {
        status: RequestStatus::Approved,
        return_status: ReturnStatus::PendingApproval,
        room_status: RoomStatus::Occupied,
    })
}

/// Approve a pending return: the loan completes and the room frees.
pub fn approve_return(return_status: ReturnStatus) -> Result<Transition, LifecycleError> {
    match return_status {
        ReturnStatus::PendingApproval => Ok(Transition {
            status: RequestStatus::Returned,
            return_status: ReturnStatus::Approved,
            room_status: RoomStatus::Available,
        }),
        other => Err(LifecycleError::NoPendingReturn(other)),
    }
}

/// Reject a pending return: the holder keeps the key and may retry.
pub fn reject_return(return_status: ReturnStatus) -> Result<Transition, LifecycleError> {
    match return_status {
        ReturnStatus::PendingApproval => Ok(Transition {
            status: RequestStatus::Approved,
            return_status: ReturnStatus::Rejected,
            room_status: RoomStatus::Occupied,
        }),
        other => Err(LifecycleError::NoPendingReturn(other)),
    }
}

/// Validate an administrative room status override.
///
/// Only `available -> maintenance` and `maintenance -> available` are legal;
/// `occupied` and `requested` are derived exclusively from the ledger and a
/// room with live requests cannot be forced into maintenance.
pub fn validate_status_override(from: RoomStatus, to: RoomStatus) -> Result<(), LifecycleError> {
    match (from, to) {
        (RoomStatus::Available, RoomStatus::Maintenance)
        | (RoomStatus::Maintenance, RoomStatus::Available) => Ok(()),
        _ => Err(LifecycleError::InvalidTransition { from, to }),
    }
}

/// Validate a room deletion against the count of its active requests.
pub fn validate_room_delete(active_requests: i64) -> Result<(), LifecycleError> {
    if active_requests > 0 {
        return Err(LifecycleError::RoomInUse);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    #[test]
    fn new_request_requires_carried_items_and_phone() {
        assert_eq!(
            validate_new_request("", "+255700000000"),
            Err(LifecycleError::MissingField("carried_items"))
        );
        assert_eq!(
            validate_new_request("   ", "+255700000000"),
            Err(LifecycleError::MissingField("carried_items"))
        );
        assert_eq!(
            validate_new_request("laptop", ""),
            Err(LifecycleError::MissingField("contact_phone"))
        );
        assert!(validate_new_request("laptop", "+255700000000").is_ok());
    }

    #[test]
    fn create_against_available_room_yields_pending_and_requested() {
        let t = authorize_new_request(RoomStatus::Available, false, false, false).unwrap();
        assert_eq!(t.status, RequestStatus::Pending);
        assert_eq!(t.return_status, ReturnStatus::None);
        assert_eq!(t.room_status, RoomStatus::Requested);
    }

    #[test]
    fn private_room_rejects_ordinary_caller_but_not_admin() {
        assert_eq!(
            authorize_new_request(RoomStatus::Available, true, false, false),
            Err(LifecycleError::RoomPrivate)
        );
        assert!(authorize_new_request(RoomStatus::Available, true, true, false).is_ok());
    }

    #[test]
    fn unavailable_room_rejects_creation() {
        for status in [
            RoomStatus::Occupied,
            RoomStatus::Requested,
            RoomStatus::Maintenance,
        ] {
            assert_eq!(
                authorize_new_request(status, false, false, false),
                Err(LifecycleError::RoomUnavailable(status))
            );
        }
    }

    #[test]
    fn second_active_key_is_rejected() {
        assert_eq!(
            authorize_new_request(RoomStatus::Available, false, false, true),
            Err(LifecycleError::ActiveKeyExists)
        );
    }

    #[test]
    fn private_check_precedes_availability_check() {
        // A non-admin probing a private room learns nothing about its state.
        assert_eq!(
            authorize_new_request(RoomStatus::Occupied, true, false, true),
            Err(LifecycleError::RoomPrivate)
        );
    }

    // -----------------------------------------------------------------------
    // Approval / rejection
    // -----------------------------------------------------------------------

    #[test]
    fn approve_pending_occupies_room() {
        let t = approve_request(RequestStatus::Pending).unwrap();
        assert_eq!(t.status, RequestStatus::Approved);
        assert_eq!(t.room_status, RoomStatus::Occupied);
    }

    #[test]
    fn approve_non_pending_is_conflict() {
        for status in [
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Returned,
        ] {
            assert_eq!(
                approve_request(status),
                Err(LifecycleError::NotPending(status))
            );
        }
    }

    #[test]
    fn reject_pending_frees_room() {
        let t = reject_request(RequestStatus::Pending).unwrap();
        assert_eq!(t.status, RequestStatus::Rejected);
        assert_eq!(t.room_status, RoomStatus::Available);
        // The rejected request is no longer active, so the holder may file
        // a new one immediately.
        assert!(!t.status.is_active());
    }

    #[test]
    fn reject_non_pending_is_conflict() {
        assert_eq!(
            reject_request(RequestStatus::Returned),
            Err(LifecycleError::NotPending(RequestStatus::Returned))
        );
    }

    // -----------------------------------------------------------------------
    // Two-phase return
    // -----------------------------------------------------------------------

    #[test]
    fn return_intent_requires_approved_request() {
        assert_eq!(
            request_return(RequestStatus::Pending, ReturnStatus::None),
            Err(LifecycleError::NotApproved(RequestStatus::Pending))
        );
        assert_eq!(
            request_return(RequestStatus::Returned, ReturnStatus::Approved),
            Err(LifecycleError::NotApproved(RequestStatus::Returned))
        );
    }

    #[test]
    fn return_intent_keeps_room_occupied() {
        let t = request_return(RequestStatus::Approved, ReturnStatus::None).unwrap();
        assert_eq!(t.status, RequestStatus::Approved);
        assert_eq!(t.return_status, ReturnStatus::PendingApproval);
        assert_eq!(t.room_status, RoomStatus::Occupied);
    }

    #[test]
    fn duplicate_return_intent_is_conflict() {
        assert_eq!(
            request_return(RequestStatus::Approved, ReturnStatus::PendingApproval),
            Err(LifecycleError::ReturnAlreadyPending)
        );
    }

    #[test]
    fn approve_return_completes_loan_and_frees_room() {
        let t = approve_return(ReturnStatus::PendingApproval).unwrap();
        assert_eq!(t.status, RequestStatus::Returned);
        assert_eq!(t.return_status, ReturnStatus::Approved);
        assert_eq!(t.room_status, RoomStatus::Available);
    }

    #[test]
    fn return_decisions_require_a_pending_return() {
        for rs in [
            ReturnStatus::None,
            ReturnStatus::Approved,
            ReturnStatus::Rejected,
        ] {
            assert_eq!(approve_return(rs), Err(LifecycleError::NoPendingReturn(rs)));
            assert_eq!(reject_return(rs), Err(LifecycleError::NoPendingReturn(rs)));
        }
    }

    #[test]
    fn rejected_return_can_be_retried() {
        // Scenario E: reject the return, then signal intent again.
        let rejected = reject_return(ReturnStatus::PendingApproval).unwrap();
        assert_eq!(rejected.status, RequestStatus::Approved);
        assert_eq!(rejected.return_status, ReturnStatus::Rejected);
        assert_eq!(rejected.room_status, RoomStatus::Occupied);

        let retried = request_return(rejected.status, rejected.return_status).unwrap();
        assert_eq!(retried.return_status, ReturnStatus::PendingApproval);
    }

    // -----------------------------------------------------------------------
    // Full lifecycle walk (scenarios A-C)
    // -----------------------------------------------------------------------

    #[test]
    fn full_loan_cycle_releases_the_holder() {
        // A: create against an available room.
        let created = authorize_new_request(RoomStatus::Available, false, false, false).unwrap();
        assert_eq!(created.status, RequestStatus::Pending);
        assert_eq!(created.room_status, RoomStatus::Requested);

        // B: approve; a second request for the same holder now conflicts.
        let approved = approve_request(created.status).unwrap();
        assert_eq!(approved.room_status, RoomStatus::Occupied);
        assert_eq!(
            authorize_new_request(RoomStatus::Available, false, false, approved.status.is_active()),
            Err(LifecycleError::ActiveKeyExists)
        );

        // C: return intent, then final approval; the holder is free again.
        let intent = request_return(approved.status, approved.return_status).unwrap();
        let done = approve_return(intent.return_status).unwrap();
        assert_eq!(done.status, RequestStatus::Returned);
        assert_eq!(done.room_status, RoomStatus::Available);
        assert!(authorize_new_request(
            RoomStatus::Available,
            false,
            false,
            done.status.is_active()
        )
        .is_ok());
    }

    #[test]
    fn retrying_a_completed_operation_returns_the_done_signal() {
        // Retrying approve after approve reports NotPending(approved),
        // never a second state change.
        let approved = approve_request(RequestStatus::Pending).unwrap();
        assert_eq!(
            approve_request(approved.status),
            Err(LifecycleError::NotPending(RequestStatus::Approved))
        );

        let done = approve_return(ReturnStatus::PendingApproval).unwrap();
        assert_eq!(
            approve_return(done.return_status),
            Err(LifecycleError::NoPendingReturn(ReturnStatus::Approved))
        );
    }

    // -----------------------------------------------------------------------
    // Room administration
    // -----------------------------------------------------------------------

    #[test]
    fn maintenance_override_is_the_only_legal_direct_transition() {
        assert!(validate_status_override(RoomStatus::Available, RoomStatus::Maintenance).is_ok());
        assert!(validate_status_override(RoomStatus::Maintenance, RoomStatus::Available).is_ok());

        for (from, to) in [
            (RoomStatus::Available, RoomStatus::Occupied),
            (RoomStatus::Available, RoomStatus::Requested),
            (RoomStatus::Occupied, RoomStatus::Maintenance),
            (RoomStatus::Requested, RoomStatus::Maintenance),
            (RoomStatus::Maintenance, RoomStatus::Occupied),
        ] {
            assert_eq!(
                validate_status_override(from, to),
                Err(LifecycleError::InvalidTransition { from, to })
            );
        }
    }

    #[test]
    fn room_with_active_requests_cannot_be_deleted() {
        assert_eq!(validate_room_delete(1), Err(LifecycleError::RoomInUse));
        assert_eq!(validate_room_delete(3), Err(LifecycleError::RoomInUse));
        assert!(validate_room_delete(0).is_ok());
    }

    // -----------------------------------------------------------------------
    // Error codes
    // -----------------------------------------------------------------------

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(LifecycleError::RoomPrivate.code(), "ROOM_PRIVATE");
        assert_eq!(
            LifecycleError::RoomUnavailable(RoomStatus::Occupied).code(),
            "ROOM_UNAVAILABLE"
        );
        assert_eq!(LifecycleError::ActiveKeyExists.code(), "ACTIVE_KEY_EXISTS");
        assert_eq!(
            LifecycleError::MissingField("contact_phone").code(),
            "MISSING_FIELD"
        );
        assert_eq!(
            LifecycleError::NotPending(RequestStatus::Approved).code(),
            "NOT_PENDING"
        );
        assert_eq!(
            LifecycleError::NotApproved(RequestStatus::Pending).code(),
            "NOT_APPROVED"
        );
        assert_eq!(
            LifecycleError::ReturnAlreadyPending.code(),
            "RETURN_ALREADY_PENDING"
        );
        assert_eq!(
            LifecycleError::NoPendingReturn(ReturnStatus::None).code(),
            "NO_PENDING_RETURN"
        );
        assert_eq!(LifecycleError::RoomInUse.code(), "ROOM_IN_USE");
        assert_eq!(
            LifecycleError::InvalidTransition {
                from: RoomStatus::Available,
                to: RoomStatus::Occupied
            }
            .code(),
            "INVALID_TRANSITION"
        );
    }
}
