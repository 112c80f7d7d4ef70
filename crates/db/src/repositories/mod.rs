//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods taking a
//! `&mut Transaction` are the row-level building blocks of the lifecycle
//! engine and must only run inside an engine-owned transaction.

pub mod event_repo;
pub mod request_repo;
pub mod room_repo;
pub mod user_repo;

pub use event_repo::EventRepo;
pub use request_repo::RequestRepo;
pub use room_repo::RoomRepo;
pub use user_repo::UserRepo;
