//! The perception-generation collaborator seam.
//!
//! Implementations may call out to a slow, fallible text model. The
//! perspective engine bounds every call with a timeout and never retries.

use async_trait::async_trait;

use super::perception::{GeneratedPerception, PerceptionRequest};

/// Errors a generator may report.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The backing service could not be reached or refused the request.
    #[error("generator unavailable: {0}")]
    Unavailable(String),

    /// The backing service answered with unusable output.
    #[error("generator returned malformed output: {0}")]
    Malformed(String),
}

/// Renders a canonical event through a character's voice and knowledge.
#[async_trait]
pub trait PerceptionGenerator: Send + Sync {
    /// Produces perception text and an emotional-state label for `request`.
    /// One call is one logical attempt.
    async fn generate(
        &self,
        request: &PerceptionRequest,
    ) -> Result<GeneratedPerception, GenerationError>;
}
