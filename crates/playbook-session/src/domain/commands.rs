//! Commands for the Session & Progress context.

use playbook_core::command::Command;
use uuid::Uuid;

/// Command to start a new session.
#[derive(Debug, Clone)]
pub struct StartSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The character to play; the story's first character when absent.
    pub character_id: Option<String>,
}

impl Command for StartSession {
    fn command_type(&self) -> &'static str {
        "session.start_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to take a choice in a session.
#[derive(Debug, Clone)]
pub struct MakeChoice {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: Uuid,
    /// The choice to take.
    pub choice_id: String,
}

impl Command for MakeChoice {
    fn command_type(&self) -> &'static str {
        "session.make_choice"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> Option<Uuid> {
        Some(self.session_id)
    }
}

/// Command to reset a session to the start node.
#[derive(Debug, Clone)]
pub struct RestartSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session identifier.
    pub session_id: Uuid,
    /// A new character to play; keeps the current one when absent.
    pub character_id: Option<String>,
}

impl Command for RestartSession {
    fn command_type(&self) -> &'static str {
        "session.restart_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> Option<Uuid> {
        Some(self.session_id)
    }
}
