//! Durable capture of published events.
//!
//! [`EventPersistence`] subscribes to the bus and appends every event to
//! the `events` table. Write failures are logged and skipped; the event
//! stream is observability/audit data, and losing one row must never stall
//! the subscribers behind it.

use keydesk_db::models::event::NewEvent;
use keydesk_db::repositories::EventRepo;
use keydesk_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::KeyEvent;

/// Background service writing all bus events to the database.
pub struct EventPersistence;

impl EventPersistence {
    /// Consume events from `rx` until the bus is closed.
    ///
    /// Intended to be spawned once at startup:
    /// `tokio::spawn(EventPersistence::run(pool, bus.subscribe()))`.
    pub async fn run(pool: DbPool, mut rx: broadcast::Receiver<KeyEvent>) {
        tracing::info!("Event persistence started");

        loop {
            match rx.recv().await {
                Ok(event) => {
                    let row = NewEvent {
                        event_type: event.event_type.clone(),
                        source_entity_type: event.source_entity_type.clone(),
                        source_entity_id: event.source_entity_id,
                        actor_user_id: event.actor_user_id,
                        payload: event.payload.clone(),
                    };
                    if let Err(e) = EventRepo::insert(&pool, &row).await {
                        tracing::error!(
                            event_type = %event.event_type,
                            error = %e,
                            "Failed to persist event",
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event persistence lagged; events lost");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed; persistence stopping");
                    break;
                }
            }
        }
    }
}
