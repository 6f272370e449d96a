//! Domain events for the Session & Progress context.

use playbook_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emitted when a session is created at the story's start node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStarted {
    /// The session identifier.
    pub session_id: Uuid,
    /// The active character.
    pub character_id: String,
    /// The start plot point.
    pub plot_point_id: String,
    /// Whether the start node already offers no choices.
    pub is_ending: bool,
}

/// Emitted when a choice moves the session to a new plot point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceApplied {
    /// The session identifier.
    pub session_id: Uuid,
    /// The choice taken.
    pub choice_id: String,
    /// Plot point the choice was taken at.
    pub from_plot_point_id: String,
    /// Plot point the choice leads to.
    pub to_plot_point_id: String,
    /// Whether the target offers no choices under the new history.
    pub is_ending: bool,
    /// Whether the target's canonical narrator differs from the active
    /// character.
    pub diverged: bool,
}

/// Emitted when a session is reset to the start node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRestarted {
    /// The session identifier.
    pub session_id: Uuid,
    /// The (possibly new) active character.
    pub character_id: String,
    /// The start plot point.
    pub plot_point_id: String,
    /// Whether the start node already offers no choices.
    pub is_ending: bool,
}

/// Event type identifier for [`SessionStarted`].
pub const SESSION_STARTED_EVENT_TYPE: &str = "session.session_started";

/// Event type identifier for [`ChoiceApplied`].
pub const CHOICE_APPLIED_EVENT_TYPE: &str = "session.choice_applied";

/// Event type identifier for [`SessionRestarted`].
pub const SESSION_RESTARTED_EVENT_TYPE: &str = "session.session_restarted";

/// Event payload variants for the Session & Progress context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEventKind {
    /// A session has started.
    SessionStarted(SessionStarted),
    /// A choice has been applied.
    ChoiceApplied(ChoiceApplied),
    /// A session has been restarted.
    SessionRestarted(SessionRestarted),
}

impl SessionEventKind {
    /// Returns the event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionStarted(_) => SESSION_STARTED_EVENT_TYPE,
            Self::ChoiceApplied(_) => CHOICE_APPLIED_EVENT_TYPE,
            Self::SessionRestarted(_) => SESSION_RESTARTED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Session & Progress context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: SessionEventKind,
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("SessionEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
