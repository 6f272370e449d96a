//! Session manager: creates, loads, serializes, and expires sessions.
//!
//! Sessions are event-sourced. The manager owns the event store handle, the
//! clock used for inactivity expiry, and one async mutex per session so that
//! state-changing operations on the same session never interleave.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::TimeDelta;
use playbook_core::aggregate::AggregateRoot;
use playbook_core::clock::Clock;
use playbook_core::error::DomainError;
use playbook_core::event::{DomainEvent, EventMetadata};
use playbook_core::repository::{EventRepository, StoredEvent};
use playbook_story::domain::graph::StoryGraph;
use tokio::sync::OwnedMutexGuard;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::aggregates::Session;
use crate::domain::divergence::score_history;
use crate::domain::events::{SessionEvent, SessionEventKind};

/// Exclusive access to one session, held for the duration of a
/// state-changing operation.
pub type SessionGuard = OwnedMutexGuard<()>;

/// Owns session persistence, per-session locking, and expiry.
pub struct SessionManager {
    graph: Arc<StoryGraph>,
    repo: Arc<dyn EventRepository>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .field("tracked", &self.tracked_count())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a manager over the given story, event store, and clock.
    /// Sessions idle for longer than `ttl` are treated as absent.
    #[must_use]
    pub fn new(
        graph: Arc<StoryGraph>,
        repo: Arc<dyn EventRepository>,
        clock: Arc<dyn Clock>,
        ttl: TimeDelta,
    ) -> Self {
        Self {
            graph,
            repo,
            clock,
            ttl,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the story graph sessions traverse.
    #[must_use]
    pub fn graph(&self) -> &Arc<StoryGraph> {
        &self.graph
    }

    /// Returns the clock used to stamp events and judge expiry.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Returns the inactivity window.
    #[must_use]
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Number of sessions this manager currently holds a lock slot for.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Creates a new session at the story start, playing `character_id` or
    /// the story's first character.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the character does not exist, or a
    /// store error if persisting the start event fails.
    pub async fn create(
        &self,
        character_id: Option<&str>,
        correlation_id: Uuid,
    ) -> Result<Session, DomainError> {
        let character_id = character_id.unwrap_or(self.graph.default_character().id.as_str());
        let mut session = Session::new(Uuid::new_v4());
        session.start(&self.graph, character_id, correlation_id, self.clock())?;
        self.commit(&mut session).await?;
        self.slot(session.id);

        info!(
            correlation_id = %correlation_id,
            session_id = %session.id,
            character_id = %session.character_id(),
            "session created"
        );
        Ok(session)
    }

    /// Loads a live session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if the session never existed or
    /// has been idle longer than the TTL, `DomainError::InternalInvariant` if
    /// its history names choices the loaded story lacks, or a store error if
    /// loading fails.
    pub async fn get(&self, session_id: Uuid) -> Result<Session, DomainError> {
        let events = self.repo.load_events(session_id).await?;
        if events.is_empty() {
            return Err(DomainError::SessionNotFound(session_id));
        }
        let session = reconstitute(session_id, &events)?;
        if session.is_expired(self.clock.as_ref(), self.ttl) {
            debug!(session_id = %session_id, "session expired");
            return Err(DomainError::SessionNotFound(session_id));
        }
        self.check_replayed_score(&session)?;
        Ok(session)
    }

    /// Acquires exclusive access to `session_id`. Waits while another
    /// operation on the same session is in flight.
    pub async fn lock(&self, session_id: Uuid) -> SessionGuard {
        self.slot(session_id).lock_owned().await
    }

    /// Persists the session's uncommitted events with optimistic concurrency
    /// against the version it was loaded at.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ConcurrencyConflict` if the stream moved since
    /// the session was loaded, or a store error if appending fails. The
    /// session is left uncommitted on error.
    pub async fn commit(&self, session: &mut Session) -> Result<(), DomainError> {
        if !session.has_uncommitted() {
            return Ok(());
        }
        let stored_events: Vec<StoredEvent> = session
            .uncommitted_events()
            .iter()
            .map(DomainEvent::to_stored)
            .collect();
        self.repo
            .append_events(session.id, session.version(), &stored_events)
            .await?;
        session.mark_committed();
        Ok(())
    }

    /// Deletes every stored session that has expired or no longer exists,
    /// including streams written by earlier processes. Sessions with an
    /// operation in flight are skipped. Returns the number of sessions
    /// evicted.
    ///
    /// # Errors
    ///
    /// Returns a store error if listing, loading, or deleting a stream fails.
    pub async fn evict_expired(&self) -> Result<usize, DomainError> {
        let mut candidates = self.repo.stream_ids().await?;
        candidates.extend(
            self.locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .keys()
                .copied(),
        );
        candidates.sort_unstable();
        candidates.dedup();

        let mut evicted = 0;
        for session_id in candidates {
            let Ok(_guard) = self.slot(session_id).try_lock_owned() else {
                continue;
            };
            let events = self.repo.load_events(session_id).await?;
            let expired = events.is_empty()
                || reconstitute(session_id, &events)?.is_expired(self.clock.as_ref(), self.ttl);
            if !expired {
                continue;
            }
            self.repo.delete_events(session_id).await?;
            self.locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&session_id);
            evicted += 1;
        }

        if evicted > 0 {
            info!(evicted, "expired sessions evicted");
        }
        Ok(evicted)
    }

    /// Rescores the replayed history against the story. The stored flags and
    /// the graph must agree on every step the history names.
    fn check_replayed_score(&self, session: &Session) -> Result<(), DomainError> {
        let rescored = score_history(&self.graph, session.character_id(), session.history())
            .map_err(|e| {
                DomainError::InternalInvariant(format!(
                    "session {} references content the loaded story lacks: {e}",
                    session.id
                ))
            })?;
        if rescored != session.divergence_score() {
            warn!(
                session_id = %session.id,
                stored = session.divergence_score(),
                rescored,
                "replayed divergence score disagrees with the story"
            );
        }
        Ok(())
    }

    fn slot(&self, session_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(session_id).or_default())
    }
}

/// Spawns a background task that calls [`SessionManager::evict_expired`]
/// every `period`.
pub fn spawn_reaper(manager: Arc<SessionManager>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = manager.evict_expired().await {
                warn!(error = %e, "session eviction failed");
            }
        }
    })
}

/// Reconstitutes a `Session` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    session_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<Session, DomainError> {
    let mut session = Session::new(session_id);
    for stored in existing_events {
        let kind: SessionEventKind =
            serde_json::from_value(stored.payload.clone()).map_err(|e| {
                DomainError::Infrastructure(format!("event deserialization failed: {e}"))
            })?;
        let event = SessionEvent {
            metadata: EventMetadata::from(stored),
            kind,
        };
        session.apply(&event);
    }
    Ok(session)
}
