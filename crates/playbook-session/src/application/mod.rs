//! Application layer for the Session & Progress context.

pub mod query_handlers;
pub mod session_manager;
