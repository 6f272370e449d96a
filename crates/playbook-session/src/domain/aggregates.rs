//! Aggregate roots for the Session & Progress context.

use chrono::{DateTime, TimeDelta, Utc};
use playbook_core::aggregate::AggregateRoot;
use playbook_core::clock::Clock;
use playbook_core::error::DomainError;
use playbook_core::event::EventMetadata;
use playbook_story::domain::graph::StoryGraph;
use uuid::Uuid;

use super::divergence::is_divergent;
use super::events::{
    ChoiceApplied, SessionEvent, SessionEventKind, SessionRestarted, SessionStarted,
};

/// The aggregate root for one player's traversal of the story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (committed event count).
    pub(crate) version: i64,
    /// Whether a `SessionStarted` event has been recorded.
    pub(crate) started: bool,
    /// The active character.
    pub(crate) character_id: String,
    /// The plot point the session currently sits at.
    pub(crate) current_plot_point: String,
    /// Choice ids taken since the last (re)start, in order.
    pub(crate) history: Vec<String>,
    /// Whether the current plot point offers no choices.
    pub(crate) is_ending: bool,
    /// Number of moves onto plot points narrated by another character.
    pub(crate) divergence_score: u32,
    /// Time of the most recent state-changing event.
    pub(crate) last_activity: Option<DateTime<Utc>>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<SessionEvent>,
}

impl Session {
    /// Creates an empty, not-yet-started session.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            started: false,
            character_id: String::new(),
            current_plot_point: String::new(),
            history: Vec::new(),
            is_ending: false,
            divergence_score: 0,
            last_activity: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Returns the active character id.
    #[must_use]
    pub fn character_id(&self) -> &str {
        &self.character_id
    }

    /// Returns the current plot point id.
    #[must_use]
    pub fn current_plot_point(&self) -> &str {
        &self.current_plot_point
    }

    /// Returns the choice history since the last (re)start.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Returns whether the session has reached an ending.
    #[must_use]
    pub fn is_ending(&self) -> bool {
        self.is_ending
    }

    /// Returns the divergence score.
    #[must_use]
    pub fn divergence_score(&self) -> u32 {
        self.divergence_score
    }

    /// Returns the time of the most recent state-changing event.
    #[must_use]
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    /// Returns whether the session has been idle longer than `ttl`.
    #[must_use]
    pub fn is_expired(&self, clock: &dyn Clock, ttl: TimeDelta) -> bool {
        self.last_activity.is_none_or(|last| clock.since(last) > ttl)
    }

    /// Starts the session at the story's start node as `character_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the character does not exist and
    /// `DomainError::InternalInvariant` if the session was already started.
    pub fn start(
        &mut self,
        graph: &StoryGraph,
        character_id: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.started {
            return Err(DomainError::InternalInvariant(format!(
                "session {} already started",
                self.id
            )));
        }
        let character = graph.get_character(character_id)?;
        let start = graph.start();
        let kind = SessionEventKind::SessionStarted(SessionStarted {
            session_id: self.id,
            character_id: character.id.clone(),
            plot_point_id: start.id.clone(),
            is_ending: graph.is_ending(&start.id, &[])?,
        });
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    /// Takes `choice_id` from the current plot point.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidChoice` if the choice is not offered at
    /// the current plot point under the current history (which includes any
    /// choice taken at an ending), and `DomainError::SessionNotFound` if the
    /// session was never started.
    pub fn apply_choice(
        &mut self,
        graph: &StoryGraph,
        choice_id: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if !self.started {
            return Err(DomainError::SessionNotFound(self.id));
        }
        let offered = graph.get_choices(&self.current_plot_point, &self.history)?;
        let Some(choice) = offered.into_iter().find(|c| c.id == choice_id) else {
            return Err(DomainError::InvalidChoice {
                choice_id: choice_id.to_owned(),
                plot_point_id: self.current_plot_point.clone(),
            });
        };

        let mut next_history = self.history.clone();
        next_history.push(choice.id.clone());
        let target = graph.get_plot_point(&choice.target)?;

        let kind = SessionEventKind::ChoiceApplied(ChoiceApplied {
            session_id: self.id,
            choice_id: choice.id.clone(),
            from_plot_point_id: self.current_plot_point.clone(),
            to_plot_point_id: target.id.clone(),
            is_ending: graph.is_ending(&target.id, &next_history)?,
            diverged: is_divergent(target, &self.character_id),
        });
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    /// Resets the session to the start node, optionally switching character.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the requested character does not
    /// exist and `DomainError::SessionNotFound` if the session was never
    /// started.
    pub fn restart(
        &mut self,
        graph: &StoryGraph,
        character_id: Option<&str>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if !self.started {
            return Err(DomainError::SessionNotFound(self.id));
        }
        let character = graph.get_character(character_id.unwrap_or(&self.character_id))?;
        let start = graph.start();
        let kind = SessionEventKind::SessionRestarted(SessionRestarted {
            session_id: self.id,
            character_id: character.id.clone(),
            plot_point_id: start.id.clone(),
            is_ending: graph.is_ending(&start.id, &[])?,
        });
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    fn record(&mut self, kind: SessionEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = SessionEvent {
            metadata: EventMetadata::record(
                kind.event_type(),
                self.id,
                self.next_sequence_number(),
                correlation_id,
                clock.now(),
            ),
            kind,
        };
        self.apply_state(&event);
        self.uncommitted_events.push(event);
    }

    fn apply_state(&mut self, event: &SessionEvent) {
        match &event.kind {
            SessionEventKind::SessionStarted(payload) => {
                self.reset_to(&payload.character_id, &payload.plot_point_id, payload.is_ending);
            }
            SessionEventKind::SessionRestarted(payload) => {
                self.reset_to(&payload.character_id, &payload.plot_point_id, payload.is_ending);
            }
            SessionEventKind::ChoiceApplied(payload) => {
                self.current_plot_point.clone_from(&payload.to_plot_point_id);
                self.history.push(payload.choice_id.clone());
                self.is_ending = payload.is_ending;
                if payload.diverged {
                    self.divergence_score += 1;
                }
            }
        }
        self.last_activity = Some(event.metadata.occurred_at);
    }

    fn reset_to(&mut self, character_id: &str, plot_point_id: &str, is_ending: bool) {
        self.started = true;
        self.character_id = character_id.to_owned();
        self.current_plot_point = plot_point_id.to_owned();
        self.history.clear();
        self.is_ending = is_ending;
        self.divergence_score = 0;
    }
}

impl AggregateRoot for Session {
    type Event = SessionEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        self.apply_state(event);
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    #[allow(clippy::cast_possible_wrap)]
    fn mark_committed(&mut self) {
        self.version += self.uncommitted_events.len() as i64;
        self.uncommitted_events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use playbook_core::event::DomainEvent;
    use playbook_story::application::loader::builtin_story;
    use playbook_test_support::FixedClock;

    fn started_session(character_id: &str) -> (StoryGraph, Session, FixedClock) {
        let graph = builtin_story().unwrap();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let mut session = Session::new(Uuid::new_v4());
        session
            .start(&graph, character_id, Uuid::new_v4(), &clock)
            .unwrap();
        session.mark_committed();
        (graph, session, clock)
    }

    #[test]
    fn test_start_places_session_at_start_node() {
        // Arrange
        let graph = builtin_story().unwrap();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let session_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let mut session = Session::new(session_id);

        // Act
        session
            .start(&graph, "ishmael", correlation_id, &clock)
            .unwrap();

        // Assert
        assert_eq!(session.current_plot_point(), "opening");
        assert_eq!(session.character_id(), "ishmael");
        assert!(session.history().is_empty());
        assert!(!session.is_ending());
        assert_eq!(session.divergence_score(), 0);
        assert_eq!(session.last_activity(), Some(clock.0));
        assert_eq!(session.uncommitted_events().len(), 1);
        let event = &session.uncommitted_events()[0];
        assert_eq!(event.event_type(), "session.session_started");
        assert_eq!(event.metadata.sequence_number, 1);
        assert_eq!(event.metadata.correlation_id, correlation_id);
        assert_eq!(event.metadata.aggregate_id, session_id);
    }

    #[test]
    fn test_start_rejects_unknown_character() {
        // Arrange
        let graph = builtin_story().unwrap();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let mut session = Session::new(Uuid::new_v4());

        // Act
        let result = session.start(&graph, "fedallah", Uuid::new_v4(), &clock);

        // Assert
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
        assert!(session.uncommitted_events().is_empty());
    }

    #[test]
    fn test_apply_choice_moves_to_target_and_extends_history() {
        // Arrange
        let (graph, mut session, clock) = started_session("ishmael");

        // Act
        session
            .apply_choice(&graph, "walk-the-waterfront", Uuid::new_v4(), &clock)
            .unwrap();

        // Assert
        assert_eq!(session.current_plot_point(), "waterfront");
        assert_eq!(session.history(), ["walk-the-waterfront".to_owned()]);
        let event = &session.uncommitted_events()[0];
        assert_eq!(event.metadata.sequence_number, 2);
        match &event.kind {
            SessionEventKind::ChoiceApplied(payload) => {
                assert_eq!(payload.from_plot_point_id, "opening");
                assert_eq!(payload.to_plot_point_id, "waterfront");
                assert!(!payload.diverged);
            }
            other => panic!("expected ChoiceApplied, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_choice_rejects_choice_not_offered_here() {
        // Arrange
        let (graph, mut session, clock) = started_session("ishmael");
        let before = session.clone();

        // Act
        let result = session.apply_choice(&graph, "sign-the-articles", Uuid::new_v4(), &clock);

        // Assert
        assert!(matches!(
            result,
            Err(DomainError::InvalidChoice { ref choice_id, ref plot_point_id })
                if choice_id == "sign-the-articles" && plot_point_id == "opening"
        ));
        assert_eq!(session, before);
    }

    #[test]
    fn test_apply_choice_rejects_unknown_choice_id() {
        // Arrange
        let (graph, mut session, clock) = started_session("ishmael");

        // Act
        let result = session.apply_choice(&graph, "swim-to-japan", Uuid::new_v4(), &clock);

        // Assert
        assert!(matches!(result, Err(DomainError::InvalidChoice { .. })));
    }

    #[test]
    fn test_apply_choice_at_ending_is_invalid() {
        // Arrange
        let (graph, mut session, clock) = started_session("ishmael");
        session
            .apply_choice(&graph, "stay-ashore", Uuid::new_v4(), &clock)
            .unwrap();
        session.mark_committed();
        assert!(session.is_ending());

        // Act
        let result = session.apply_choice(&graph, "walk-the-waterfront", Uuid::new_v4(), &clock);

        // Assert
        assert!(matches!(result, Err(DomainError::InvalidChoice { .. })));
    }

    #[test]
    fn test_divergence_counts_moves_onto_other_narrators() {
        // Arrange
        let (graph, mut session, clock) = started_session("queequeg");

        // Act
        session
            .apply_choice(&graph, "walk-the-waterfront", Uuid::new_v4(), &clock)
            .unwrap();
        let after_first = session.divergence_score();
        session
            .apply_choice(&graph, "heed-the-whalers", Uuid::new_v4(), &clock)
            .unwrap();

        // Assert
        assert_eq!(after_first, 1);
        assert_eq!(session.divergence_score(), 2);
    }

    #[test]
    fn test_restart_resets_progress_and_switches_character() {
        // Arrange
        let (graph, mut session, clock) = started_session("queequeg");
        session
            .apply_choice(&graph, "walk-the-waterfront", Uuid::new_v4(), &clock)
            .unwrap();

        // Act
        session
            .restart(&graph, Some("starbuck"), Uuid::new_v4(), &clock)
            .unwrap();

        // Assert
        assert_eq!(session.character_id(), "starbuck");
        assert_eq!(session.current_plot_point(), "opening");
        assert!(session.history().is_empty());
        assert_eq!(session.divergence_score(), 0);
        assert_eq!(session.uncommitted_events().len(), 2);
    }

    #[test]
    fn test_restart_keeps_character_when_none_given() {
        // Arrange
        let (graph, mut session, clock) = started_session("pip");

        // Act
        session.restart(&graph, None, Uuid::new_v4(), &clock).unwrap();

        // Assert
        assert_eq!(session.character_id(), "pip");
    }

    #[test]
    fn test_mark_committed_advances_version() {
        // Arrange
        let (graph, mut session, clock) = started_session("ishmael");
        session
            .apply_choice(&graph, "call-me-ishmael", Uuid::new_v4(), &clock)
            .unwrap();

        // Act
        session.mark_committed();

        // Assert
        assert_eq!(session.version(), 2);
        assert!(session.uncommitted_events().is_empty());
    }

    #[test]
    fn test_is_expired_compares_idle_time_with_ttl() {
        // Arrange
        let (_graph, session, clock) = started_session("ishmael");
        let ttl = TimeDelta::seconds(60);

        // Act / Assert
        assert!(!session.is_expired(&FixedClock(clock.0 + TimeDelta::seconds(60)), ttl));
        assert!(session.is_expired(&FixedClock(clock.0 + TimeDelta::seconds(61)), ttl));
        assert!(Session::new(Uuid::new_v4()).is_expired(&clock, ttl));
    }
}
