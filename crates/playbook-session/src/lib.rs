//! PlayBook: Session & Progress bounded context.
//!
//! Responsible for one player's traversal of the story graph: the active
//! character, the current plot point, the ordered choice history, and the
//! divergence from the canonical narration. Sessions are event-sourced and
//! expire after a period of inactivity.

pub mod application;
pub mod domain;
