//! Event-sourced aggregates.
//!
//! An aggregate records new events into an uncommitted buffer as commands
//! succeed. The version counts only events that reached the store, so it is
//! also the expected version for the next append.

use uuid::Uuid;

use crate::event::DomainEvent;

/// An aggregate rebuilt by folding its event stream.
pub trait AggregateRoot: Send + Sync {
    /// Events this aggregate records and replays.
    type Event: DomainEvent;

    /// Stream identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Number of stored events folded into this instance.
    fn version(&self) -> i64;

    /// Folds one stored event during reconstitution and advances the version.
    fn apply(&mut self, event: &Self::Event);

    /// Events recorded since the last commit, oldest first.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Called once the uncommitted events are stored.
    fn mark_committed(&mut self);

    /// Whether anything awaits a commit.
    fn has_uncommitted(&self) -> bool {
        !self.uncommitted_events().is_empty()
    }

    /// Sequence number the next recorded event takes.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version() + self.uncommitted_events().len() as i64 + 1
    }
}
