//! Story content loading.
//!
//! Content is parsed from YAML, hashed for versioning, and validated into a
//! [`StoryGraph`]. Any failure here is fatal at startup.

use std::path::Path;

use playbook_core::error::DomainError;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::domain::graph::StoryGraph;
use crate::domain::model::StoryDocument;

/// The bundled Moby-Dick story.
pub const BUILTIN_STORY: &str = include_str!("../../content/moby_dick.yaml");

/// Returns the SHA-256 hex digest of `source`.
#[must_use]
pub fn content_hash(source: &str) -> String {
    format!("{:x}", Sha256::digest(source.as_bytes()))
}

/// Parses and validates story content from YAML text.
///
/// # Errors
///
/// Returns `DomainError::InternalInvariant` if the YAML does not describe a
/// story or the story violates a graph invariant.
pub fn parse_story(source: &str) -> Result<StoryGraph, DomainError> {
    let document: StoryDocument = serde_yaml::from_str(source)
        .map_err(|e| DomainError::InternalInvariant(format!("story content is malformed: {e}")))?;

    let graph = StoryGraph::new(document, content_hash(source))?;
    info!(
        title = graph.title(),
        plot_points = graph.plot_points().len(),
        characters = graph.characters().len(),
        content_hash = graph.content_hash(),
        "story loaded"
    );
    Ok(graph)
}

/// Loads story content from a YAML file.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the file cannot be read, or
/// `DomainError::InternalInvariant` if its content is invalid.
pub fn load_story(path: &Path) -> Result<StoryGraph, DomainError> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        DomainError::Infrastructure(format!("cannot read story {}: {e}", path.display()))
    })?;
    parse_story(&source)
}

/// Loads the bundled story.
///
/// # Errors
///
/// Returns `DomainError::InternalInvariant` if the bundled content is
/// invalid.
pub fn builtin_story() -> Result<StoryGraph, DomainError> {
    parse_story(BUILTIN_STORY)
}
