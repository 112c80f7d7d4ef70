//! Key request entity models and DTOs.
//!
//! `KeyRequest` is the raw ledger row; it never leaves the service
//! unprojected. Handlers build a [`RequestView`] for the concrete viewer,
//! which applies the contact-data redaction policy.

use keydesk_core::status::StatusId;
use keydesk_core::types::{DbId, Timestamp};
use keydesk_core::visibility;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct KeyRequest {
    pub id: DbId,
    pub room_id: DbId,
    pub holder_id: DbId,
    pub created_by: DbId,
    pub on_behalf: bool,
    pub carried_items: String,
    pub contact_phone: String,
    pub status_id: StatusId,
    pub return_status_id: StatusId,
    pub requested_at: Timestamp,
    pub return_requested_at: Option<Timestamp>,
    pub returned_at: Option<Timestamp>,
    pub escalated_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for submitting a new key request via `POST /api/v1/requests`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateKeyRequest {
    pub room_id: DbId,
    pub carried_items: String,
    pub contact_phone: String,
    /// Set by administrators filing on a member's behalf; everyone else
    /// must leave this empty.
    pub holder_id: Option<DbId>,
}

/// Query parameters for `GET /api/v1/requests`.
#[derive(Debug, Deserialize)]
pub struct RequestListQuery {
    /// Filter by status ID (e.g. 1 = pending, 2 = approved).
    pub status_id: Option<StatusId>,
    /// Filter by room.
    pub room_id: Option<DbId>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Viewer-specific projection of a [`KeyRequest`].
///
/// This is the only request shape handlers may serialize: `contact_phone`
/// is the real value for administrators and the holder, and the redaction
/// marker for every other viewer.
#[derive(Debug, Clone, Serialize)]
pub struct RequestView {
    pub id: DbId,
    pub room_id: DbId,
    pub holder_id: DbId,
    pub created_by: DbId,
    pub on_behalf: bool,
    pub carried_items: String,
    pub contact_phone: String,
    pub status_id: StatusId,
    pub return_status_id: StatusId,
    pub requested_at: Timestamp,
    pub return_requested_at: Option<Timestamp>,
    pub returned_at: Option<Timestamp>,
}

impl RequestView {
    /// Project a request for the given viewer, redacting contact data
    /// unless the viewer is an administrator or the holder.
    pub fn project(request: &KeyRequest, viewer_id: DbId, viewer_role: &str) -> Self {
        let contact_phone = visibility::project_contact(
            &request.contact_phone,
            viewer_id,
            viewer_role,
            request.holder_id,
        );
        Self {
            id: request.id,
            room_id: request.room_id,
            holder_id: request.holder_id,
            created_by: request.created_by,
            on_behalf: request.on_behalf,
            carried_items: request.carried_items.clone(),
            contact_phone,
            status_id: request.status_id,
            return_status_id: request.return_status_id,
            requested_at: request.requested_at,
            return_requested_at: request.return_requested_at,
            returned_at: request.returned_at,
        }
    }
}

/// A row from the overdue listing: the request joined with room and holder
/// context for triage.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OverdueKeyRequest {
    pub id: DbId,
    pub room_id: DbId,
    pub room_code: String,
    pub room_name: String,
    pub holder_id: DbId,
    pub holder_name: String,
    pub contact_phone: String,
    pub carried_items: String,
    pub requested_at: Timestamp,
    pub escalated_at: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use keydesk_core::roles::{ROLE_ADMIN, ROLE_MEMBER};
    use keydesk_core::status::{RequestStatus, ReturnStatus};
    use keydesk_core::visibility::REDACTED_CONTACT;

    fn sample_request() -> KeyRequest {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
        KeyRequest {
            id: 11,
            room_id: 3,
            holder_id: 7,
            created_by: 7,
            on_behalf: false,
            carried_items: "laptop".into(),
            contact_phone: "+255700000000".into(),
            status_id: RequestStatus::Approved.id(),
            return_status_id: ReturnStatus::None.id(),
            requested_at: at,
            return_requested_at: None,
            returned_at: None,
            escalated_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn holder_view_keeps_contact_phone() {
        let view = RequestView::project(&sample_request(), 7, ROLE_MEMBER);
        assert_eq!(view.contact_phone, "+255700000000");
    }

    #[test]
    fn admin_view_keeps_contact_phone() {
        let view = RequestView::project(&sample_request(), 42, ROLE_ADMIN);
        assert_eq!(view.contact_phone, "+255700000000");
    }

    #[test]
    fn other_member_view_is_redacted() {
        let view = RequestView::project(&sample_request(), 8, ROLE_MEMBER);
        assert_eq!(view.contact_phone, REDACTED_CONTACT);
    }

    #[test]
    fn projection_preserves_lifecycle_fields() {
        let request = sample_request();
        let view = RequestView::project(&request, 8, ROLE_MEMBER);
        assert_eq!(view.id, request.id);
        assert_eq!(view.status_id, request.status_id);
        assert_eq!(view.return_status_id, request.return_status_id);
        assert_eq!(view.requested_at, request.requested_at);
    }
}
