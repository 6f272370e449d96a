//! Application layer for the Story Graph context.

pub mod loader;
pub mod query_handlers;
