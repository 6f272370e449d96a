//! Story fixtures: small graphs for edge cases the built-in story lacks.

use playbook_core::error::DomainError;
use playbook_story::application::loader::parse_story;
use playbook_story::domain::graph::StoryGraph;

/// A three-node story with a cycle. `dock` offers `board` to `deck`; `deck`
/// offers `return` to `dock` and, once `board` is in the history, `sink` to
/// the ending `deep`. `deck` is narrated by the cook, the rest by the mate.
pub const TINY_STORY: &str = r#"
title: Tiny
start: dock
characters:
  - id: mate
    name: MATE
    description: "A mate."
    special_ability: "NONE"
    perspective: "A mate's view"
    voice:
      tone: plain
      focus: work
      metaphors: none
      openers: ["Aye,"]
      absent_template: "Not at {location}."
      default_emotion: tired
    knowledge:
      dock: &tide ["The tide is high."]
      deck: *tide
      deep: ["The tide is high.", "The ship is lost."]
  - id: cook
    name: COOK
    description: "A cook."
    special_ability: "NONE"
    perspective: "A cook's view"
    voice:
      tone: grumbling
      focus: food
      metaphors: kitchen
      absent_template: "The galley is far from {location}."
      emotions:
        danger: alarmed
      default_emotion: hungry
plot_points:
  - id: dock
    title: Dock
    chapter: 1
    event: "The ship waits."
    location: the dock
    time: dawn
    narrator: mate
    present: [mate, cook]
    choices:
      - id: board
        text: "Board"
        target: deck
  - id: deck
    title: Deck
    chapter: 2
    event: "Waves break over the **rail**."
    location: the deck
    time: noon
    narrator: cook
    present: [mate]
    themes: [danger]
    choices:
      - id: return
        text: "Go ashore again"
        target: dock
      - id: sink
        text: "Ride it out"
        target: deep
        requires: [board]
  - id: deep
    title: Deep
    chapter: 3
    event: "Down she goes."
    location: the deep
    time: dusk
    narrator: mate
    present: [mate, cook]
"#;

/// Parses [`TINY_STORY`].
///
/// # Errors
///
/// Returns `DomainError::InternalInvariant` if the fixture no longer
/// validates.
pub fn tiny_story() -> Result<StoryGraph, DomainError> {
    parse_story(TINY_STORY)
}
