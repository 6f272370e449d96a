//! Domain layer for the Session & Progress context.

pub mod aggregates;
pub mod commands;
pub mod divergence;
pub mod events;
