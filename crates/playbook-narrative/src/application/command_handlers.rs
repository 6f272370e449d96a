//! Command handlers for the Perspective Engine context.
//!
//! Each handler renders before it persists: a generation failure returns an
//! error with the stored session untouched, so the client may retry.

use playbook_core::command::Command;
use playbook_core::error::DomainError;
use playbook_session::application::session_manager::SessionManager;
use playbook_session::domain::aggregates::Session;
use playbook_session::domain::commands::{MakeChoice, RestartSession, StartSession};
use tracing::{info, warn};

use crate::application::perspective_engine::PerspectiveEngine;
use crate::domain::perception::Perception;

/// A session together with the perception of its current plot point.
#[derive(Debug, Clone)]
pub struct GameOutcome {
    /// The session after the command.
    pub session: Session,
    /// The active character's perception of the current plot point.
    pub perception: Perception,
}

/// Handles `StartSession`: renders the start node for the requested
/// character, then creates the session.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown character,
/// `DomainError::GenerationFailure` if rendering fails, or a store error.
pub async fn handle_start_session(
    command: &StartSession,
    manager: &SessionManager,
    engine: &PerspectiveEngine,
) -> Result<GameOutcome, DomainError> {
    let graph = engine.graph();
    let character = match command.character_id.as_deref() {
        Some(id) => graph.get_character(id)?,
        None => graph.default_character(),
    };
    let perception = engine.render(&graph.start().id, &character.id).await?;
    let session = manager
        .create(Some(character.id.as_str()), command.correlation_id)
        .await?;

    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id(),
        session_id = %session.id,
        character_id = %session.character_id(),
        "session started"
    );

    Ok(GameOutcome {
        session,
        perception,
    })
}

/// Handles `MakeChoice` under the session's lock: loads the session, applies
/// the choice, renders the target, and only then persists.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound`, `DomainError::InvalidChoice`,
/// `DomainError::GenerationFailure`, or a store error. On any error the
/// stored session is unchanged.
pub async fn handle_make_choice(
    command: &MakeChoice,
    manager: &SessionManager,
    engine: &PerspectiveEngine,
) -> Result<GameOutcome, DomainError> {
    let _guard = manager.lock(command.session_id).await;
    let session = manager.get(command.session_id).await?;

    let (mut next, perception) = match engine
        .apply_choice(
            &session,
            &command.choice_id,
            command.correlation_id,
            manager.clock(),
        )
        .await
    {
        Ok(applied) => applied,
        Err(e) => {
            warn!(
                correlation_id = %command.correlation_id,
                session_id = %command.session_id,
                choice_id = %command.choice_id,
                error = %e,
                "choice rejected"
            );
            return Err(e);
        }
    };
    manager.commit(&mut next).await?;

    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id(),
        session_id = ?command.session_id(),
        choice_id = %command.choice_id,
        plot_point_id = %next.current_plot_point(),
        divergence_score = next.divergence_score(),
        is_ending = next.is_ending(),
        "choice applied"
    );
    Ok(GameOutcome {
        session: next,
        perception,
    })
}

/// Handles `RestartSession` under the session's lock: resets to the start
/// node, optionally as a different character.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound`, `DomainError::NotFound` for an
/// unknown character, `DomainError::GenerationFailure`, or a store error.
pub async fn handle_restart_session(
    command: &RestartSession,
    manager: &SessionManager,
    engine: &PerspectiveEngine,
) -> Result<GameOutcome, DomainError> {
    let _guard = manager.lock(command.session_id).await;
    let mut session = manager.get(command.session_id).await?;

    session.restart(
        engine.graph(),
        command.character_id.as_deref(),
        command.correlation_id,
        manager.clock(),
    )?;
    let perception = engine
        .render(session.current_plot_point(), session.character_id())
        .await?;
    manager.commit(&mut session).await?;

    info!(
        command = command.command_type(),
        correlation_id = %command.correlation_id(),
        session_id = ?command.session_id(),
        character_id = %session.character_id(),
        "session restarted"
    );
    Ok(GameOutcome {
        session,
        perception,
    })
}
