//! PlayBook: Story Graph bounded context.
//!
//! Responsible for the read-only story content: plot points, characters and
//! their voices, choices and their preconditions, and the literary personas.
//! Content is loaded from YAML once at startup, validated, hashed, and never
//! mutated afterwards.

pub mod application;
pub mod domain;
