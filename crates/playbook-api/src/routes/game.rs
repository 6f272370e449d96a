//! Routes for playing a session: start, choose, command, restart, progress, render.

use axum::extract::{Path, State};
use axum::{
    Json, Router,
    routing::{get, post},
};
use playbook_core::error::DomainError;
use playbook_narrative::application::command_handlers::{
    self, GameOutcome,
};
use playbook_narrative::application::query_handlers::get_game_state;
use playbook_session::application::query_handlers::{SessionView, get_session_by_id};
use playbook_session::domain::commands::{MakeChoice, RestartSession, StartSession};
use playbook_story::application::query_handlers::character_select_lines;
use playbook_story::domain::graph::StoryGraph;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::command::{GameCommand, HELP_LINES, THEMES_HEADING, UNKNOWN_COMMAND};
use crate::error::ApiError;
use crate::presenter::{GameView, TerminalFrame};
use crate::state::AppState;

/// Request body for POST /start and POST /{session_id}/restart.
#[derive(Debug, Default, Deserialize)]
pub struct CharacterRequest {
    /// Character id or display name; optional.
    #[serde(default)]
    pub character: Option<String>,
}

/// Request body for POST /{session_id}/choice.
#[derive(Debug, Deserialize)]
pub struct ChoiceRequest {
    /// The choice to take.
    pub choice_id: String,
}

/// Request body for POST /{session_id}/command.
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    /// Free-form terminal input.
    pub command: String,
}

/// Response body for POST /{session_id}/command.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// Always `"ok"`; failures use the error body instead.
    pub status: &'static str,
    /// The command as received.
    pub command: String,
    /// A one-line notice, e.g. for unrecognised input.
    pub message: Option<String>,
    /// Extra output such as help text.
    pub lines: Vec<String>,
    /// The game state after the command.
    pub game: GameView,
}

fn resolve_character(
    graph: &StoryGraph,
    requested: Option<&str>,
) -> Result<Option<String>, DomainError> {
    requested
        .map(|name| {
            graph
                .find_character(name)
                .map(|c| c.id.clone())
                .ok_or_else(|| DomainError::not_found("character", name))
        })
        .transpose()
}

async fn make_choice(
    state: &AppState,
    session_id: Uuid,
    choice_id: String,
) -> Result<GameOutcome, DomainError> {
    let command = MakeChoice {
        correlation_id: Uuid::new_v4(),
        session_id,
        choice_id,
    };
    info!(correlation_id = %command.correlation_id, "handling make_choice command");
    command_handlers::handle_make_choice(&command, &state.sessions, &state.engine).await
}

async fn restart(
    state: &AppState,
    session_id: Uuid,
    character_id: Option<String>,
) -> Result<GameOutcome, DomainError> {
    let command = RestartSession {
        correlation_id: Uuid::new_v4(),
        session_id,
        character_id,
    };
    info!(correlation_id = %command.correlation_id, "handling restart_session command");
    command_handlers::handle_restart_session(&command, &state.sessions, &state.engine).await
}

/// Takes `choice_id` once the session lock is held. A choice that is no
/// longer on offer by then, e.g. because another request moved the session
/// first, yields `None` instead of an error.
async fn take_if_offered(
    state: &AppState,
    session_id: Uuid,
    choice_id: String,
) -> Result<Option<GameOutcome>, DomainError> {
    match make_choice(state, session_id, choice_id).await {
        Ok(outcome) => Ok(Some(outcome)),
        Err(DomainError::InvalidChoice { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

fn themes_lines(graph: &StoryGraph, plot_point_id: &str) -> Result<Vec<String>, DomainError> {
    let themes = &graph.get_plot_point(plot_point_id)?.themes;
    let listed = if themes.is_empty() {
        "none".to_owned()
    } else {
        themes.join(", ")
    };
    Ok(vec![THEMES_HEADING.to_owned(), listed])
}

/// POST /start
#[instrument(skip(state, request), fields(character = ?request.character))]
async fn start_game(
    State(state): State<AppState>,
    Json(request): Json<CharacterRequest>,
) -> Result<Json<GameView>, ApiError> {
    let command = StartSession {
        correlation_id: Uuid::new_v4(),
        character_id: resolve_character(state.graph(), request.character.as_deref())?,
    };

    info!(correlation_id = %command.correlation_id, "handling start_session command");

    let outcome =
        command_handlers::handle_start_session(&command, &state.sessions, &state.engine).await?;

    Ok(Json(GameView::project(&outcome, state.graph())?))
}

/// GET /{session_id}
#[instrument(skip(state))]
async fn get_game(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<GameView>, ApiError> {
    let outcome = get_game_state(&state.sessions, &state.engine, session_id).await?;
    Ok(Json(GameView::project(&outcome, state.graph())?))
}

/// POST /{session_id}/choice
#[instrument(skip(state, request), fields(choice_id = %request.choice_id))]
async fn choose(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ChoiceRequest>,
) -> Result<Json<GameView>, ApiError> {
    let outcome = make_choice(&state, session_id, request.choice_id).await?;
    Ok(Json(GameView::project(&outcome, state.graph())?))
}

/// POST /{session_id}/command
#[instrument(skip(state, request), fields(command = %request.command))]
async fn run_command(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<CommandRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let parsed = GameCommand::parse(&request.command);
    let graph = state.graph();
    let current = get_game_state(&state.sessions, &state.engine, session_id).await?;
    let offered: Vec<String> = graph
        .get_choices(current.session.current_plot_point(), current.session.history())?
        .into_iter()
        .map(|c| c.id.clone())
        .collect();

    let mut message = None;
    let mut lines = Vec::new();
    let taken = match parsed {
        GameCommand::Look => Some(current),
        GameCommand::Help => {
            lines = HELP_LINES.iter().map(|l| (*l).to_owned()).collect();
            Some(current)
        }
        GameCommand::Themes => {
            lines = themes_lines(graph, current.session.current_plot_point())?;
            Some(current)
        }
        GameCommand::Restart => Some(restart(&state, session_id, None).await?),
        GameCommand::CallMe(name) => match graph.find_character(&name) {
            Some(character) => {
                Some(restart(&state, session_id, Some(character.id.clone())).await?)
            }
            None => {
                message = Some(format!("No one aboard answers to {name}."));
                lines = character_select_lines(graph);
                Some(current)
            }
        },
        GameCommand::Numbered(n) => {
            match n.checked_sub(1).and_then(|i| offered.get(i)).cloned() {
                Some(choice_id) => take_if_offered(&state, session_id, choice_id).await?,
                None => None,
            }
        }
        GameCommand::Choice(choice_id) if offered.contains(&choice_id) => {
            take_if_offered(&state, session_id, choice_id).await?
        }
        GameCommand::Choice(_) | GameCommand::Unknown => None,
    };
    let outcome = match taken {
        Some(outcome) => outcome,
        None => {
            message = Some(UNKNOWN_COMMAND.to_owned());
            get_game_state(&state.sessions, &state.engine, session_id).await?
        }
    };

    Ok(Json(CommandResponse {
        status: "ok",
        game: GameView::project(&outcome, graph)?,
        command: request.command,
        message,
        lines,
    }))
}

/// POST /{session_id}/restart
#[instrument(skip(state, request), fields(character = ?request.character))]
async fn restart_game(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<CharacterRequest>,
) -> Result<Json<GameView>, ApiError> {
    let character_id = resolve_character(state.graph(), request.character.as_deref())?;
    let outcome = restart(&state, session_id, character_id).await?;
    Ok(Json(GameView::project(&outcome, state.graph())?))
}

/// GET /{session_id}/progress
#[instrument(skip(state))]
async fn get_progress(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(get_session_by_id(&state.sessions, session_id).await?))
}

/// GET /{session_id}/terminal
#[instrument(skip(state))]
async fn get_terminal(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<TerminalFrame>, ApiError> {
    let outcome = get_game_state(&state.sessions, &state.engine, session_id).await?;
    let view = GameView::project(&outcome, state.graph())?;
    Ok(Json(TerminalFrame::from_view(&view, state.typing_delay)))
}

/// Returns the router for game sessions.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start_game))
        .route("/{session_id}", get(get_game))
        .route("/{session_id}/choice", post(choose))
        .route("/{session_id}/command", post(run_command))
        .route("/{session_id}/restart", post(restart_game))
        .route("/{session_id}/progress", get(get_progress))
        .route("/{session_id}/terminal", get(get_terminal))
}
