//! Storage seam for event streams.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DomainError;

/// One row of an event stream as a backend persists it.
#[derive(Debug, Clone)]
pub struct StoredEvent {
    pub event_id: Uuid,
    pub aggregate_id: Uuid,
    pub event_type: String,
    /// Serialized payload; the envelope lives in the other columns.
    pub payload: serde_json::Value,
    pub sequence_number: i64,
    pub correlation_id: Uuid,
    pub causation_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

/// Append-only event streams keyed by aggregate id.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Every event of the stream in sequence order. Unknown streams are empty.
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError>;

    /// Appends `events` if the stream is still at `expected_version`, and
    /// fails with `DomainError::ConcurrencyConflict` otherwise.
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError>;

    /// Drops the stream. Dropping an unknown stream succeeds.
    async fn delete_events(&self, aggregate_id: Uuid) -> Result<(), DomainError>;

    /// Ids of every stream the backend holds, including streams written by
    /// other processes.
    async fn stream_ids(&self) -> Result<Vec<Uuid>, DomainError>;
}
