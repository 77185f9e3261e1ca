use async_trait::async_trait;
use sqlx::{types::Json, Postgres, Transaction};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::domain::DomainEvent;

/// Record `events` in the outbox as part of the caller's transaction, so they
/// are stored if and only if the entity write commits.
pub async fn append(
    tx: &mut Transaction<'_, Postgres>,
    events: &[DomainEvent],
) -> Result<(), DatabaseError> {
    for event in events {
        let (aggregate_type, aggregate_id) = event.aggregate();
        sqlx::query(
            r#"
            INSERT INTO outbox_events
                (id, aggregate_type, aggregate_id, event_type, payload, occurred_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(aggregate_type)
        .bind(aggregate_id)
        .bind(event.event_type())
        .bind(Json(event))
        .bind(event.occurred_at())
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Receives events after the write that raised them has committed.
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    async fn dispatch(&self, events: &[DomainEvent]);
}

/// Default dispatcher: logs each event. Delivery to other systems reads the
/// outbox table.
pub struct LoggingDispatcher;

#[async_trait]
impl EventDispatcher for LoggingDispatcher {
    async fn dispatch(&self, events: &[DomainEvent]) {
        for event in events {
            let (aggregate_type, aggregate_id) = event.aggregate();
            tracing::info!(
                event_type = event.event_type(),
                aggregate_type,
                %aggregate_id,
                "Domain event committed"
            );
        }
    }
}
