//! Repository for the `events` table (append-only).

use sqlx::PgPool;

use crate::models::event::NewEvent;

/// Provides append operations for the durable event log.
pub struct EventRepo;

impl EventRepo {
    /// Append an event row.
    pub async fn insert(pool: &PgPool, event: &NewEvent) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO events \
                 (event_type, source_entity_type, source_entity_id, actor_user_id, payload) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&event.event_type)
        .bind(&event.source_entity_type)
        .bind(event.source_entity_id)
        .bind(event.actor_user_id)
        .bind(&event.payload)
        .execute(pool)
        .await?;
        Ok(())
    }
}
