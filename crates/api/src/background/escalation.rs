//! Periodic escalation of critically overdue keys.
//!
//! Scans the ledger on a fixed interval for approved, unreturned requests
//! that crossed the critical threshold and have not been escalated yet.
//! Each hit is stamped `escalated_at` (a guarded, set-once update, so a
//! request escalates at most once across restarts and concurrent scans)
//! and published as a `request.escalated` event for the notification
//! router to deliver.
//!
//! The scanner holds no locks, reads a snapshot, and never mutates
//! lifecycle state.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use keydesk_core::urgency::CRITICAL_AFTER_HOURS;
use keydesk_db::repositories::RequestRepo;
use keydesk_db::DbPool;
use keydesk_events::bus::EVENT_REQUEST_ESCALATED;
use keydesk_events::{EventBus, KeyEvent};
use tokio_util::sync::CancellationToken;

/// Run the escalation scan loop until `cancel` is triggered.
pub async fn run(
    pool: DbPool,
    event_bus: Arc<EventBus>,
    scan_interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = scan_interval.as_secs(),
        critical_after_hours = CRITICAL_AFTER_HOURS,
        "Overdue escalation scanner started"
    );

    let mut interval = tokio::time::interval(scan_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Overdue escalation scanner stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = scan_once(&pool, &event_bus).await {
                    tracing::error!(error = %e, "Escalation scan failed");
                }
            }
        }
    }
}

/// One scan: stamp and publish every newly critical request.
async fn scan_once(pool: &DbPool, event_bus: &EventBus) -> Result<(), sqlx::Error> {
    let cutoff = Utc::now() - chrono::Duration::hours(CRITICAL_AFTER_HOURS);
    let newly_critical = RequestRepo::list_unescalated_critical(pool, cutoff).await?;

    if newly_critical.is_empty() {
        tracing::debug!("Escalation scan: nothing newly critical");
        return Ok(());
    }

    let mut escalated = 0usize;
    for request in newly_critical {
        // The guard loses the race if another scanner stamped first;
        // only the winner publishes.
        if RequestRepo::mark_escalated(pool, request.id).await? {
            escalated += 1;
            tracing::warn!(
                request_id = request.id,
                room_id = request.room_id,
                holder_id = request.holder_id,
                requested_at = %request.requested_at,
                "Key critically overdue",
            );
            event_bus.publish(
                KeyEvent::new(EVENT_REQUEST_ESCALATED)
                    .with_source("request", request.id)
                    .with_payload(serde_json::json!({
                        "room_id": request.room_id,
                        "holder_id": request.holder_id,
                        "requested_at": request.requested_at,
                    })),
            );
        }
    }

    tracing::info!(escalated, "Escalation scan: requests escalated");
    Ok(())
}
