//! In-memory implementation of the `EventRepository` trait.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use playbook_core::error::DomainError;
use playbook_core::repository::{EventRepository, StoredEvent};

/// Process-local event repository. Streams live until deleted or the process
/// exits.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    streams: RwLock<HashMap<Uuid, Vec<StoredEvent>>>,
}

impl InMemoryEventRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of streams currently held.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned.
    pub fn stream_count(&self) -> Result<usize, DomainError> {
        let streams = self.streams.read().map_err(poisoned)?;
        Ok(streams.len())
    }
}

fn poisoned<T>(_: T) -> DomainError {
    DomainError::Infrastructure("event stream lock poisoned".into())
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let streams = self.streams.read().map_err(poisoned)?;
        Ok(streams.get(&aggregate_id).cloned().unwrap_or_default())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        let mut streams = self.streams.write().map_err(poisoned)?;
        let stream = streams.entry(aggregate_id).or_default();

        let actual = stream.last().map_or(0, |e| e.sequence_number);
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }

        stream.extend_from_slice(events);
        tracing::debug!(%aggregate_id, appended = events.len(), "appended events");
        Ok(())
    }

    async fn delete_events(&self, aggregate_id: Uuid) -> Result<(), DomainError> {
        let mut streams = self.streams.write().map_err(poisoned)?;
        streams.remove(&aggregate_id);
        Ok(())
    }

    async fn stream_ids(&self) -> Result<Vec<Uuid>, DomainError> {
        let streams = self.streams.read().map_err(poisoned)?;
        Ok(streams.keys().copied().collect())
    }
}
