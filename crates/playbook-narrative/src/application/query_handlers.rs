//! Query handlers for the Perspective Engine context.

use playbook_core::error::DomainError;
use playbook_session::application::session_manager::SessionManager;
use uuid::Uuid;

use crate::application::command_handlers::GameOutcome;
use crate::application::perspective_engine::PerspectiveEngine;

/// Loads a live session and renders its current plot point.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` for a missing or expired session,
/// or `DomainError::GenerationFailure` if rendering fails.
pub async fn get_game_state(
    manager: &SessionManager,
    engine: &PerspectiveEngine,
    session_id: Uuid,
) -> Result<GameOutcome, DomainError> {
    let session = manager.get(session_id).await?;
    let perception = engine
        .render(session.current_plot_point(), session.character_id())
        .await?;
    Ok(GameOutcome {
        session,
        perception,
    })
}
