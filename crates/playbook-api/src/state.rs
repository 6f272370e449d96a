//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use playbook_narrative::application::perspective_engine::PerspectiveEngine;
use playbook_session::application::session_manager::SessionManager;
use playbook_story::domain::graph::StoryGraph;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Session persistence, locking, and expiry.
    pub sessions: Arc<SessionManager>,
    /// Perception rendering and choice application.
    pub engine: Arc<PerspectiveEngine>,
    /// Per-character pacing for terminal frames.
    pub typing_delay: Duration,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        sessions: Arc<SessionManager>,
        engine: Arc<PerspectiveEngine>,
        typing_delay: Duration,
    ) -> Self {
        Self {
            sessions,
            engine,
            typing_delay,
        }
    }

    /// The immutable story both services were built over.
    #[must_use]
    pub fn graph(&self) -> &StoryGraph {
        self.engine.graph()
    }
}
