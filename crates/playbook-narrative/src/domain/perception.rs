//! Perception value types.

use playbook_story::domain::markdown;
use playbook_story::domain::model::{Character, PlotPoint, VoiceProfile};
use serde::Serialize;

/// The canonical facts of a plot point, independent of any viewpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalEvent {
    /// The event description as plain text.
    pub summary: String,
    /// Where the event takes place.
    pub location: String,
    /// When the event takes place.
    pub time: String,
    /// Thematic tags, in source order.
    pub themes: Vec<String>,
    /// Whether the viewing character is there to see it.
    pub witnessed: bool,
}

impl CanonicalEvent {
    /// Builds the canonical event of `plot_point` as seen by `character_id`.
    /// The narrator always witnesses their own plot point.
    #[must_use]
    pub fn from_plot_point(plot_point: &PlotPoint, character_id: &str) -> Self {
        Self {
            summary: markdown::to_plain_text(&plot_point.event),
            location: plot_point.location.clone(),
            time: plot_point.time.clone(),
            themes: plot_point.themes.clone(),
            witnessed: plot_point.narrator == character_id || plot_point.is_present(character_id),
        }
    }
}

/// Everything a generator may use to render a perception, and nothing more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerceptionRequest {
    /// The canonical event.
    pub event: CanonicalEvent,
    /// The viewing character's voice.
    pub voice: VoiceProfile,
    /// Facts the character knows at this plot point, in sorted order.
    pub knowledge: Vec<String>,
    /// The character's perception of the previous plot point, if any.
    pub prior: Option<String>,
}

impl PerceptionRequest {
    /// Assembles the request for `character` at `plot_point`.
    #[must_use]
    pub fn new(plot_point: &PlotPoint, character: &Character, prior: Option<String>) -> Self {
        Self {
            event: CanonicalEvent::from_plot_point(plot_point, &character.id),
            voice: character.voice.clone(),
            knowledge: character.knowledge_at(&plot_point.id).into_iter().collect(),
            prior,
        }
    }
}

/// Raw generator output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPerception {
    /// The rendered text.
    pub text: String,
    /// The emotional-state label.
    pub emotional_state: String,
}

/// A plot point rendered through one character's knowledge and voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Perception {
    /// The plot point rendered.
    pub plot_point_id: String,
    /// The viewing character.
    pub character_id: String,
    /// The rendered text.
    pub text: String,
    /// The emotional-state label.
    pub emotional_state: String,
}
