//! Caller identity.
//!
//! Token issuance (login, credentials, 2FA) belongs to the external
//! identity service; this crate only validates the HS256 access tokens it
//! mints and extracts the caller's id and role from them.

pub mod jwt;
