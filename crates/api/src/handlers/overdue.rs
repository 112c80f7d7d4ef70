//! Handlers for the `/overdue` triage listing.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use keydesk_core::urgency::{self, UrgencyTier, OVERDUE_AFTER_HOURS};
use keydesk_db::models::request::OverdueKeyRequest;
use keydesk_db::repositories::RequestRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// An overdue request annotated with its urgency tier.
#[derive(Debug, Serialize)]
pub struct OverdueView {
    #[serde(flatten)]
    pub request: OverdueKeyRequest,
    pub urgency: UrgencyTier,
    pub elapsed_hours: i64,
}

/// GET /api/v1/overdue
///
/// List every approved, unreturned request at tier overdue or above,
/// most overdue first. Admin-only; contact data is intentionally visible
/// here -- this is the triage surface.
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let cutoff = now - chrono::Duration::hours(OVERDUE_AFTER_HOURS);

    let rows = RequestRepo::list_overdue(&state.pool, cutoff).await?;
    let views: Vec<OverdueView> = rows
        .into_iter()
        .map(|request| {
            let urgency = urgency::classify(request.requested_at, now);
            let elapsed_hours = urgency::elapsed_hours(request.requested_at, now);
            OverdueView {
                request,
                urgency,
                elapsed_hours,
            }
        })
        .collect();

    Ok(Json(DataResponse { data: views }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn overdue_view_serializes_flat_with_tier_label() {
        let requested_at = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let now = requested_at + Duration::hours(50);

        let view = OverdueView {
            request: OverdueKeyRequest {
                id: 5,
                room_id: 2,
                room_code: "B12".into(),
                room_name: "Electronics Lab".into(),
                holder_id: 7,
                holder_name: "Asha".into(),
                contact_phone: "+255700000000".into(),
                carried_items: "oscilloscope probes".into(),
                requested_at,
                escalated_at: None,
            },
            urgency: urgency::classify(requested_at, now),
            elapsed_hours: urgency::elapsed_hours(requested_at, now),
        };

        let json = serde_json::to_value(&view).unwrap();
        // Flattened request fields sit beside the computed annotations.
        assert_eq!(json["room_code"], "B12");
        assert_eq!(json["urgency"], "high");
        assert_eq!(json["elapsed_hours"], 50);
    }
}
