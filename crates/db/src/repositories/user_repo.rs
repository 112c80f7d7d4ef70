//! Repository for the `users` table (read-only in this service).

use keydesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::User;

/// Column list for `users` queries, joining the role name.
const COLUMNS: &str = "u.id, u.name, u.email, u.phone, r.name AS role, u.created_at";

/// Provides lookups for user accounts.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by their internal ID, with the role name resolved.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id WHERE u.id = $1"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
