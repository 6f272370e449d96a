//! Domain layer for the Perspective Engine context.

pub mod generator;
pub mod perception;
pub mod rule_engine;
