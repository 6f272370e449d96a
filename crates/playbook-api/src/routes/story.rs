//! Read-only routes over the loaded story content.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use playbook_story::application::query_handlers::{
    self, PlotPointView, StoryOverview,
};
use playbook_story::domain::model::Persona;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for GET /.
#[derive(Debug, Serialize)]
pub struct StoryResponse {
    /// Title, start, content hash, and playable characters.
    #[serde(flatten)]
    pub overview: StoryOverview,
    /// The character select screen as terminal lines.
    pub select_screen: Vec<String>,
}

/// GET /
async fn get_story(State(state): State<AppState>) -> Json<StoryResponse> {
    let graph = state.graph();
    Json(StoryResponse {
        overview: query_handlers::get_story_overview(graph),
        select_screen: query_handlers::character_select_lines(graph),
    })
}

/// GET /plot-points/{id}
async fn get_plot_point(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlotPointView>, ApiError> {
    Ok(Json(query_handlers::get_plot_point_by_id(state.graph(), &id)?))
}

/// GET /personas
async fn list_personas(State(state): State<AppState>) -> Json<Vec<Persona>> {
    Json(query_handlers::list_personas(state.graph()))
}

/// GET /personas/{id}
async fn get_persona(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Persona>, ApiError> {
    Ok(Json(query_handlers::get_persona_by_id(state.graph(), &id)?))
}

/// Returns the router for story content.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_story))
        .route("/plot-points/{id}", get(get_plot_point))
        .route("/personas", get(list_personas))
        .route("/personas/{id}", get(get_persona))
}
