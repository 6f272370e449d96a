//! Domain layer for the Story Graph context.

pub mod graph;
pub mod markdown;
pub mod model;
pub mod validation;
