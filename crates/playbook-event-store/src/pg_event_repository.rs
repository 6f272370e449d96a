//! `PostgreSQL` implementation of the `EventRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use playbook_core::error::DomainError;
use playbook_core::repository::{EventRepository, StoredEvent};

/// PostgreSQL-backed event repository.
#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    /// Creates a new `PgEventRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if a migration fails.
    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::Infrastructure(format!("migration failed: {e}")))
    }
}

fn infrastructure(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let rows = sqlx::query(
            r"SELECT event_id, aggregate_id, event_type, payload, sequence_number,
                     correlation_id, causation_id, occurred_at
              FROM domain_events
              WHERE aggregate_id = $1
              ORDER BY sequence_number",
        )
        .bind(aggregate_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        rows.iter()
            .map(|row| {
                Ok(StoredEvent {
                    event_id: row.try_get("event_id")?,
                    aggregate_id: row.try_get("aggregate_id")?,
                    event_type: row.try_get("event_type")?,
                    payload: row.try_get("payload")?,
                    sequence_number: row.try_get("sequence_number")?,
                    correlation_id: row.try_get("correlation_id")?,
                    causation_id: row.try_get("causation_id")?,
                    occurred_at: row.try_get::<DateTime<Utc>, _>("occurred_at")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(infrastructure)
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(infrastructure)?;

        let actual: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(sequence_number), 0) FROM domain_events WHERE aggregate_id = $1",
        )
        .bind(aggregate_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(infrastructure)?;

        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }

        for event in events {
            let result = sqlx::query(
                r"INSERT INTO domain_events
                    (event_id, aggregate_id, event_type, payload, sequence_number,
                     correlation_id, causation_id, occurred_at)
                  VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(event.event_id)
            .bind(event.aggregate_id)
            .bind(&event.event_type)
            .bind(&event.payload)
            .bind(event.sequence_number)
            .bind(event.correlation_id)
            .bind(event.causation_id)
            .bind(event.occurred_at)
            .execute(&mut *tx)
            .await;

            // A concurrent writer that won the race trips the
            // (aggregate_id, sequence_number) unique constraint.
            if let Err(sqlx::Error::Database(db_err)) = &result {
                if db_err.is_unique_violation() {
                    return Err(DomainError::ConcurrencyConflict {
                        aggregate_id,
                        expected: expected_version,
                        actual: event.sequence_number,
                    });
                }
            }
            result.map_err(infrastructure)?;
        }

        tx.commit().await.map_err(infrastructure)?;
        tracing::debug!(%aggregate_id, appended = events.len(), "appended events");
        Ok(())
    }

    async fn delete_events(&self, aggregate_id: Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM domain_events WHERE aggregate_id = $1")
            .bind(aggregate_id)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }

    async fn stream_ids(&self) -> Result<Vec<Uuid>, DomainError> {
        sqlx::query_scalar("SELECT DISTINCT aggregate_id FROM domain_events")
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)
    }
}
