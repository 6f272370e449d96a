//! Query handlers for the Story Graph context.
//!
//! Read-only view DTOs over the loaded story.

use playbook_core::error::DomainError;
use serde::Serialize;

use crate::domain::graph::StoryGraph;
use crate::domain::markdown;
use crate::domain::model::{Character, Persona};

/// One entry on the character select screen.
#[derive(Debug, Clone, Serialize)]
pub struct CharacterSummary {
    /// Character identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Flavour ability.
    pub special_ability: String,
    /// How this character sees the story.
    pub perspective: String,
}

impl From<&Character> for CharacterSummary {
    fn from(character: &Character) -> Self {
        Self {
            id: character.id.clone(),
            name: character.name.clone(),
            description: character.description.clone(),
            special_ability: character.special_ability.clone(),
            perspective: character.perspective.clone(),
        }
    }
}

/// Summary of the loaded story.
#[derive(Debug, Serialize)]
pub struct StoryOverview {
    /// Title of the source novel.
    pub title: String,
    /// Start plot point.
    pub start: String,
    /// Content version hash.
    pub content_hash: String,
    /// Number of plot points.
    pub plot_point_count: usize,
    /// Playable characters in select-screen order.
    pub characters: Vec<CharacterSummary>,
}

/// A choice as shown in plot point detail.
#[derive(Debug, Serialize)]
pub struct ChoiceDetail {
    /// Choice identifier.
    pub id: String,
    /// Display text.
    pub text: String,
    /// Target plot point.
    pub target: String,
    /// Required prior choices.
    pub requires: Vec<String>,
}

/// Read-only view of a plot point.
#[derive(Debug, Serialize)]
pub struct PlotPointView {
    /// Plot point identifier.
    pub id: String,
    /// Chapter title.
    pub title: String,
    /// Chapter number.
    pub chapter: u32,
    /// Location.
    pub location: String,
    /// Time marker.
    pub time: String,
    /// Canonical narrator.
    pub narrator: String,
    /// Characters present.
    pub present: Vec<String>,
    /// Thematic tags.
    pub themes: Vec<String>,
    /// Canonical event as plain text.
    pub event: String,
    /// Every outgoing choice, regardless of preconditions.
    pub choices: Vec<ChoiceDetail>,
}

/// Returns the story overview.
#[must_use]
pub fn get_story_overview(graph: &StoryGraph) -> StoryOverview {
    StoryOverview {
        title: graph.title().to_owned(),
        start: graph.start().id.clone(),
        content_hash: graph.content_hash().to_owned(),
        plot_point_count: graph.plot_points().len(),
        characters: graph.characters().iter().map(CharacterSummary::from).collect(),
    }
}

/// Retrieves a plot point by id.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the plot point does not exist.
pub fn get_plot_point_by_id(graph: &StoryGraph, id: &str) -> Result<PlotPointView, DomainError> {
    let plot_point = graph.get_plot_point(id)?;
    Ok(PlotPointView {
        id: plot_point.id.clone(),
        title: plot_point.title.clone(),
        chapter: plot_point.chapter,
        location: plot_point.location.clone(),
        time: plot_point.time.clone(),
        narrator: plot_point.narrator.clone(),
        present: plot_point.present.clone(),
        themes: plot_point.themes.clone(),
        event: markdown::to_plain_text(&plot_point.event),
        choices: plot_point
            .choices
            .iter()
            .map(|c| ChoiceDetail {
                id: c.id.clone(),
                text: c.text.clone(),
                target: c.target.clone(),
                requires: c.requires.clone(),
            })
            .collect(),
    })
}

/// Lists all personas.
#[must_use]
pub fn list_personas(graph: &StoryGraph) -> Vec<Persona> {
    graph.personas().to_vec()
}

/// Retrieves a persona by id.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the persona does not exist.
pub fn get_persona_by_id(graph: &StoryGraph, id: &str) -> Result<Persona, DomainError> {
    graph.get_persona(id).cloned()
}

/// The character select screen as terminal lines.
#[must_use]
pub fn character_select_lines(graph: &StoryGraph) -> Vec<String> {
    graph
        .characters()
        .iter()
        .flat_map(|c| {
            [
                format!("Call me {}", c.name),
                format!("   {}", c.description),
                format!("   {}", c.special_ability),
            ]
        })
        .collect()
}
