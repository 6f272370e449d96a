//! PlayBook event stores.
//!
//! Sessions are persisted as append-only event streams. The in-memory store
//! is the default; the PostgreSQL store keeps save state across restarts.

pub mod in_memory;
pub mod pg_event_repository;
