//! User entity model.
//!
//! Accounts are provisioned by the external identity service; this crate
//! only reads them to resolve holders and roles.

use keydesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A user row joined with its role name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Role name from the `roles` lookup table (e.g. `"admin"`, `"member"`).
    pub role: String,
    pub created_at: Timestamp,
}
