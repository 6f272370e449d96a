//! Domain events and their envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::StoredEvent;

/// Envelope shared by every event, whatever its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub event_id: Uuid,
    /// Payload discriminator, e.g. `session.choice_applied`.
    pub event_type: String,
    pub aggregate_id: Uuid,
    /// 1-based position in the aggregate's stream.
    pub sequence_number: i64,
    pub correlation_id: Uuid,
    /// The command or event that caused this one.
    pub causation_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    /// Metadata for an event recorded directly by a command, so the command's
    /// correlation id is also its cause.
    #[must_use]
    pub fn record(
        event_type: &str,
        aggregate_id: Uuid,
        sequence_number: i64,
        correlation_id: Uuid,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.to_owned(),
            aggregate_id,
            sequence_number,
            correlation_id,
            causation_id: correlation_id,
            occurred_at,
        }
    }
}

impl From<&StoredEvent> for EventMetadata {
    fn from(stored: &StoredEvent) -> Self {
        Self {
            event_id: stored.event_id,
            event_type: stored.event_type.clone(),
            aggregate_id: stored.aggregate_id,
            sequence_number: stored.sequence_number,
            correlation_id: stored.correlation_id,
            causation_id: stored.causation_id,
            occurred_at: stored.occurred_at,
        }
    }
}

/// A fact recorded by an aggregate.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Payload discriminator.
    fn event_type(&self) -> &'static str;

    /// Payload as JSON, without the envelope.
    fn to_payload(&self) -> serde_json::Value;

    fn metadata(&self) -> &EventMetadata;

    /// Flattens envelope and payload into the row a repository stores.
    fn to_stored(&self) -> StoredEvent {
        let meta = self.metadata();
        StoredEvent {
            event_id: meta.event_id,
            aggregate_id: meta.aggregate_id,
            event_type: self.event_type().to_owned(),
            payload: self.to_payload(),
            sequence_number: meta.sequence_number,
            correlation_id: meta.correlation_id,
            causation_id: meta.causation_id,
            occurred_at: meta.occurred_at,
        }
    }
}
