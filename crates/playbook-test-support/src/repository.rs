//! Test repositories: stand-in `EventRepository` implementations.

use std::sync::Mutex;

use async_trait::async_trait;
use playbook_core::error::DomainError;
use playbook_core::repository::{EventRepository, StoredEvent};
use uuid::Uuid;

/// Returns a canned stream from every `load_events` call and records every
/// append and delete without storing anything.
#[derive(Debug, Default)]
pub struct RecordingEventRepository {
    stream: Vec<StoredEvent>,
    appended: Mutex<Vec<(Uuid, i64, Vec<StoredEvent>)>>,
    deleted: Mutex<Vec<Uuid>>,
}

impl RecordingEventRepository {
    /// Create a recorder whose `load_events` always yields `stream`.
    #[must_use]
    pub fn new(stream: Vec<StoredEvent>) -> Self {
        Self {
            stream,
            ..Self::default()
        }
    }

    /// Snapshot of every `(aggregate_id, expected_version, events)` append.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_events(&self) -> Vec<(Uuid, i64, Vec<StoredEvent>)> {
        self.appended.lock().unwrap().clone()
    }

    /// Snapshot of every deleted aggregate id.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn deleted_streams(&self) -> Vec<Uuid> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventRepository for RecordingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.stream.clone())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        self.appended
            .lock()
            .unwrap()
            .push((aggregate_id, expected_version, events.to_vec()));
        Ok(())
    }

    async fn delete_events(&self, aggregate_id: Uuid) -> Result<(), DomainError> {
        self.deleted.lock().unwrap().push(aggregate_id);
        Ok(())
    }

    async fn stream_ids(&self) -> Result<Vec<Uuid>, DomainError> {
        let mut ids: Vec<Uuid> = self.stream.iter().map(|e| e.aggregate_id).collect();
        ids.dedup();
        Ok(ids)
    }
}

/// A repository where no session ever exists: loads are empty and writes are
/// silently dropped.
#[derive(Debug)]
pub struct EmptyEventRepository;

#[async_trait]
impl EventRepository for EmptyEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(vec![])
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Ok(())
    }

    async fn delete_events(&self, _aggregate_id: Uuid) -> Result<(), DomainError> {
        Ok(())
    }

    async fn stream_ids(&self) -> Result<Vec<Uuid>, DomainError> {
        Ok(vec![])
    }
}

/// A repository whose every call fails with an infrastructure error.
#[derive(Debug)]
pub struct FailingEventRepository;

#[async_trait]
impl EventRepository for FailingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn delete_events(&self, _aggregate_id: Uuid) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn stream_ids(&self) -> Result<Vec<Uuid>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
