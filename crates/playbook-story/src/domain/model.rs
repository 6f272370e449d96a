//! Story content value types.
//!
//! These mirror the YAML content format one-to-one. Lists keep their
//! source order: choice order in particular is what players see.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// The whole story document as authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryDocument {
    /// Display title of the source novel.
    pub title: String,
    /// Identifier of the plot point every session starts at.
    pub start: String,
    /// Playable characters, in select-screen order.
    pub characters: Vec<Character>,
    /// Nodes of the story graph.
    pub plot_points: Vec<PlotPoint>,
    /// Meta-aware literary personas.
    #[serde(default)]
    pub personas: Vec<Persona>,
}

/// A node in the story graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotPoint {
    /// Unique identifier.
    pub id: String,
    /// Chapter title.
    pub title: String,
    /// Chapter number in the source novel.
    pub chapter: u32,
    /// Canonical event description (Markdown).
    pub event: String,
    /// Where the event happens.
    pub location: String,
    /// Time marker.
    pub time: String,
    /// Character who narrates this moment in the canonical text.
    pub narrator: String,
    /// Characters present at the event.
    #[serde(default)]
    pub present: Vec<String>,
    /// Thematic tags, most prominent first.
    #[serde(default)]
    pub themes: Vec<String>,
    /// Outgoing edges, in presentation order.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl PlotPoint {
    /// Returns true if `character_id` witnesses this event.
    #[must_use]
    pub fn is_present(&self, character_id: &str) -> bool {
        self.present.iter().any(|c| c == character_id)
    }
}

/// An outgoing edge from a plot point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Globally unique identifier; recorded in session history.
    pub id: String,
    /// Display text.
    pub text: String,
    /// Plot point this choice leads to.
    pub target: String,
    /// Choices that must all appear in the session history before this one
    /// is offered.
    #[serde(default)]
    pub requires: Vec<String>,
}

impl Choice {
    /// Returns true if the precondition is satisfied by `history`.
    #[must_use]
    pub fn is_available(&self, history: &[String]) -> bool {
        self.requires
            .iter()
            .all(|required| history.iter().any(|taken| taken == required))
    }
}

/// A playable character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// One-line description for the select screen.
    pub description: String,
    /// Flavour ability shown on the select screen.
    pub special_ability: String,
    /// How this character sees the story.
    pub perspective: String,
    /// Structured voice configuration.
    pub voice: VoiceProfile,
    /// Canonical knowledge: the cumulative facts known at each plot point.
    #[serde(default)]
    pub knowledge: BTreeMap<String, Vec<String>>,
}

impl Character {
    /// What this character canonically knows at `plot_point_id`. Plot points
    /// without an entry yield the empty set.
    #[must_use]
    pub fn knowledge_at(&self, plot_point_id: &str) -> BTreeSet<String> {
        self.knowledge
            .get(plot_point_id)
            .map(|facts| facts.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Per-character voice rules shared by the rule-based and generative
/// perception generators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// Tone descriptor, e.g. "philosophical".
    pub tone: String,
    /// What the character dwells on.
    pub focus: String,
    /// Source of the character's imagery.
    pub metaphors: String,
    /// Sentence openers; one is chosen per perception.
    #[serde(default)]
    pub openers: Vec<String>,
    /// Phrases every perception must contain.
    #[serde(default)]
    pub required_phrases: Vec<String>,
    /// Phrases the character never uses, with their substitutes.
    #[serde(default)]
    pub forbidden_phrases: Vec<PhraseRule>,
    /// Template for events the character did not witness. `{location}` is
    /// substituted.
    pub absent_template: String,
    /// Emotional state per thematic tag.
    #[serde(default)]
    pub emotions: BTreeMap<String, String>,
    /// Emotional state when no theme matches.
    pub default_emotion: String,
}

/// A forbidden phrase and its replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseRule {
    /// Phrase to remove (matched case-insensitively).
    pub phrase: String,
    /// Text substituted in its place.
    pub replacement: String,
}

/// A meta-aware literary persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Lifespan.
    pub era: String,
    /// Stylistic traits.
    #[serde(default)]
    pub writing_style: Vec<String>,
    /// Preoccupations.
    #[serde(default)]
    pub themes: Vec<String>,
    /// How the persona speaks about being fictional.
    pub self_awareness: String,
}
