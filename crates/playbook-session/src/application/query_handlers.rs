//! Query handlers for the Session & Progress context.

use chrono::{DateTime, Utc};
use playbook_core::error::DomainError;
use serde::Serialize;
use uuid::Uuid;

use crate::application::session_manager::SessionManager;
use crate::domain::aggregates::Session;

/// Read-only projection of a session's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// The active character.
    pub character_id: String,
    /// The current plot point.
    pub plot_point_id: String,
    /// Choice ids taken since the last (re)start.
    pub history: Vec<String>,
    /// Whether the session has reached an ending.
    pub is_ending: bool,
    /// Moves onto plot points narrated by another character.
    pub divergence_score: u32,
    /// Time of the most recent state-changing event.
    pub last_activity: Option<DateTime<Utc>>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id,
            character_id: session.character_id().to_owned(),
            plot_point_id: session.current_plot_point().to_owned(),
            history: session.history().to_vec(),
            is_ending: session.is_ending(),
            divergence_score: session.divergence_score(),
            last_activity: session.last_activity(),
        }
    }
}

/// Loads a live session and projects it.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` for a missing or expired session.
pub async fn get_session_by_id(
    manager: &SessionManager,
    session_id: Uuid,
) -> Result<SessionView, DomainError> {
    let session = manager.get(session_id).await?;
    Ok(SessionView::from(&session))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeDelta, TimeZone, Utc};
    use playbook_event_store::in_memory::InMemoryEventRepository;
    use playbook_story::application::loader::builtin_story;
    use playbook_test_support::FixedClock;
    use uuid::Uuid;

    use super::*;

    #[tokio::test]
    async fn test_get_session_by_id_projects_progress() {
        // Arrange
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let manager = SessionManager::new(
            Arc::new(builtin_story().unwrap()),
            Arc::new(InMemoryEventRepository::new()),
            Arc::new(FixedClock(now)),
            TimeDelta::seconds(60),
        );
        let session = manager.create(Some("pip"), Uuid::new_v4()).await.unwrap();

        // Act
        let view = get_session_by_id(&manager, session.id).await.unwrap();

        // Assert
        assert_eq!(view.session_id, session.id);
        assert_eq!(view.character_id, "pip");
        assert_eq!(view.plot_point_id, "opening");
        assert!(view.history.is_empty());
        assert_eq!(view.divergence_score, 0);
        assert_eq!(view.last_activity, Some(now));
    }
}
