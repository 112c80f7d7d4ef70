//! Domain logic for the keydesk room-access service.
//!
//! This crate holds everything the key lifecycle needs that is independent
//! of storage and transport:
//!
//! - [`status`] -- room / request / return status enums backed by the seeded
//!   lookup tables.
//! - [`lifecycle`] -- the transition rules for a key request, from creation
//!   through approval, possession, return intent, and final return approval.
//! - [`urgency`] -- the overdue classification ladder for unreturned keys.
//! - [`visibility`] -- the contact-data redaction policy.
//! - [`error`] / [`roles`] / [`types`] -- shared error type, role names, and
//!   id/timestamp aliases used by the `db` and `api` crates.
//!
//! Nothing in this crate performs I/O; the `api` crate's engine applies
//! these rules inside database transactions.

pub mod error;
pub mod lifecycle;
pub mod roles;
pub mod status;
pub mod types;
pub mod urgency;
pub mod visibility;
