//! Commands: requests to change a session.

use uuid::Uuid;

/// A request handled by exactly one command handler.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable name used in logs, e.g. `session.make_choice`.
    fn command_type(&self) -> &'static str;

    /// Identifier carried through every event the command produces.
    fn correlation_id(&self) -> Uuid;

    /// The session the command addresses. `None` for commands that create
    /// one.
    fn session_id(&self) -> Option<Uuid> {
        None
    }
}
