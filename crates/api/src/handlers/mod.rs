//! HTTP handlers, grouped by resource.

pub mod health;
pub mod overdue;
pub mod requests;
pub mod rooms;
