//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
///
/// Every operation-level failure leaves session state untouched: a session
/// transition either commits completely or not at all.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A plot point, character, choice, or persona reference does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What kind of thing was looked up.
        kind: &'static str,
        /// The identifier that was missing.
        id: String,
    },

    /// The session is unknown or has expired.
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// The choice is not among those currently offered.
    #[error("choice {choice_id} is not offered at {plot_point_id}")]
    InvalidChoice {
        /// The rejected choice.
        choice_id: String,
        /// The plot point the session was at.
        plot_point_id: String,
    },

    /// The perception generator failed or timed out. Transient; the caller
    /// may retry the same request.
    #[error("generation failure: {0}")]
    GenerationFailure(String),

    /// Story content violates a graph invariant.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),

    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// A validation error in request input.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}
