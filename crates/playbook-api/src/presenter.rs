//! Presentation adapter: JSON and terminal renderings of a game state.
//!
//! Both renderings are pure projections of a session plus its perception.
//! Terminal pacing lives here and nowhere else.

use std::time::Duration;

use playbook_core::error::DomainError;
use playbook_narrative::application::command_handlers::GameOutcome;
use playbook_story::domain::graph::StoryGraph;
use serde::Serialize;
use uuid::Uuid;

/// Column width of the terminal rendering.
pub const TERMINAL_WIDTH: usize = 80;

/// Prompt shown after every terminal frame.
pub const PROMPT: &str = ">";

/// The active character as shown to the player.
#[derive(Debug, Clone, Serialize)]
pub struct CharacterRef {
    /// Character identifier.
    pub id: String,
    /// Display name, upper case as on the select screen.
    pub name: String,
}

/// The current plot point as shown to the player.
#[derive(Debug, Clone, Serialize)]
pub struct PlotPointRef {
    /// Plot point identifier.
    pub id: String,
    /// Chapter title.
    pub title: String,
    /// Chapter number in the novel.
    pub chapter: u32,
    /// Where the moment takes place.
    pub location: String,
    /// When it takes place.
    pub time: String,
    /// Thematic tags, in source order.
    pub themes: Vec<String>,
}

/// An offered choice.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceView {
    /// Choice identifier, accepted by the command endpoint.
    pub id: String,
    /// Menu text.
    pub text: String,
}

/// Structured rendering of a game state.
#[derive(Debug, Clone, Serialize)]
pub struct GameView {
    /// The session identifier.
    pub session_id: Uuid,
    /// The active character.
    pub character: CharacterRef,
    /// Where the session stands.
    pub plot_point: PlotPointRef,
    /// The character's telling of the current plot point.
    pub perception: String,
    /// How the character feels about it.
    pub emotional_state: String,
    /// Choices on offer, in menu order.
    pub choices: Vec<ChoiceView>,
    /// Whether nothing more is on offer.
    pub is_ending: bool,
    /// Choice ids taken since the last (re)start.
    pub history: Vec<String>,
    /// Steps onto plot points another character narrates.
    pub divergence_score: u32,
}

impl GameView {
    /// Projects `outcome` against the story it was played in.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the session references content the
    /// story no longer has.
    pub fn project(outcome: &GameOutcome, graph: &StoryGraph) -> Result<Self, DomainError> {
        let session = &outcome.session;
        let character = graph.get_character(session.character_id())?;
        let plot_point = graph.get_plot_point(session.current_plot_point())?;
        let choices = graph
            .get_choices(&plot_point.id, session.history())?
            .into_iter()
            .map(|c| ChoiceView {
                id: c.id.clone(),
                text: c.text.clone(),
            })
            .collect();

        Ok(Self {
            session_id: session.id,
            character: CharacterRef {
                id: character.id.clone(),
                name: character.name.clone(),
            },
            plot_point: PlotPointRef {
                id: plot_point.id.clone(),
                title: plot_point.title.clone(),
                chapter: plot_point.chapter,
                location: plot_point.location.clone(),
                time: plot_point.time.clone(),
                themes: plot_point.themes.clone(),
            },
            perception: outcome.perception.text.clone(),
            emotional_state: outcome.perception.emotional_state.clone(),
            choices,
            is_ending: session.is_ending(),
            history: session.history().to_vec(),
            divergence_score: session.divergence_score(),
        })
    }
}

/// One paced line of terminal output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalLine {
    /// At most [`TERMINAL_WIDTH`] characters.
    pub text: String,
    /// How long the client should take to type this line out.
    pub delay_ms: u64,
}

/// A screenful of terminal output followed by a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalFrame {
    /// Wrapped output, typed out in order.
    pub lines: Vec<TerminalLine>,
    /// Always [`PROMPT`].
    pub prompt: &'static str,
}

impl TerminalFrame {
    /// Wraps and paces `lines`.
    #[must_use]
    pub fn from_lines<S: AsRef<str>>(lines: &[S], typing_delay: Duration) -> Self {
        let per_char = u64::try_from(typing_delay.as_millis()).unwrap_or(u64::MAX);
        let lines = lines
            .iter()
            .flat_map(|line| wrap(line.as_ref(), TERMINAL_WIDTH))
            .map(|text| {
                let chars = u64::try_from(text.chars().count()).unwrap_or(u64::MAX);
                TerminalLine {
                    delay_ms: chars.saturating_mul(per_char),
                    text,
                }
            })
            .collect();
        Self {
            lines,
            prompt: PROMPT,
        }
    }

    /// Renders a game view as the retro terminal shows it.
    #[must_use]
    pub fn from_view(view: &GameView, typing_delay: Duration) -> Self {
        Self::from_lines(&terminal_lines(view), typing_delay)
    }
}

fn terminal_lines(view: &GameView) -> Vec<String> {
    let mut lines = vec![
        format!(
            "CHAPTER {}: {}",
            view.plot_point.chapter,
            view.plot_point.title.to_uppercase()
        ),
        format!("{}, {}", view.plot_point.location, view.plot_point.time),
        String::new(),
    ];
    lines.extend(view.perception.split('\n').map(str::to_owned));
    lines.push(String::new());
    lines.push(format!(
        "[{} feels {}]",
        view.character.name, view.emotional_state
    ));
    if view.divergence_score > 0 {
        let steps = if view.divergence_score == 1 { "step" } else { "steps" };
        lines.push(format!(
            "WARNING: this telling has strayed {} {steps} from the canonical narration.",
            view.divergence_score
        ));
    }
    lines.push(String::new());
    if view.is_ending {
        lines.push("THE END. Type RESTART to begin again.".to_owned());
    } else {
        lines.extend(
            view.choices
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{}. {}", i + 1, c.text)),
        );
    }
    lines
}

/// Greedy word wrap at `width` columns. Words longer than the width are
/// split; empty input yields one empty line.
#[must_use]
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if current_len > 0 && current_len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += word.len();
        current.extend(word);
    }
    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}
