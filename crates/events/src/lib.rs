//! Keydesk event bus and notification infrastructure.
//!
//! Building blocks for the service-wide event system:
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`KeyEvent`] -- the canonical domain event envelope.
//! - [`EventPersistence`] -- background service that durably writes every
//!   event to the `events` table.
//! - [`delivery`] -- best-effort external delivery (email).
//!
//! Events are published by the lifecycle engine after a transaction
//! commits; nothing here can roll a state transition back.

pub mod bus;
pub mod delivery;
pub mod persistence;

pub use bus::{EventBus, KeyEvent};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use persistence::EventPersistence;
