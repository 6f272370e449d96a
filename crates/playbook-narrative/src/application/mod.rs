//! Application layer for the Perspective Engine context.

pub mod command_handlers;
pub mod perspective_engine;
pub mod query_handlers;
