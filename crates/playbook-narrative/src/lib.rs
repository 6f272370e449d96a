//! PlayBook: Perspective Engine bounded context.
//!
//! Renders a plot point as one character perceives it and advances sessions
//! through the story graph. Text generation sits behind the
//! [`PerceptionGenerator`](domain::generator::PerceptionGenerator) seam; the
//! bundled [`RuleBasedGenerator`](domain::rule_engine::RuleBasedGenerator) is
//! fully deterministic.

pub mod application;
pub mod domain;
