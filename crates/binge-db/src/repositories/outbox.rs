//! PostgreSQL implementation of OutboxRepository

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::instrument;

use binge_core::entities::NotificationIntent;
use binge_core::traits::{OutboxRepository, RepoResult};
use binge_core::value_objects::Snowflake;

use crate::models::OutboxModel;

use super::error::map_db_error;

/// PostgreSQL implementation of OutboxRepository
#[derive(Clone)]
pub struct PgOutboxRepository {
    pool: PgPool,
}

impl PgOutboxRepository {
    /// Create a new PgOutboxRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OutboxRepository for PgOutboxRepository {
    #[instrument(skip(self))]
    async fn claim_pending(
        &self,
        limit: i64,
        now: DateTime<Utc>,
        lease: Duration,
    ) -> RepoResult<Vec<NotificationIntent>> {
        // SKIP LOCKED lets several workers claim disjoint batches.
        let mut rows = sqlx::query_as::<_, OutboxModel>(
            r#"
            UPDATE notification_outbox
            SET leased_until = $2
            WHERE id IN (
                SELECT id FROM notification_outbox
                WHERE processed_at IS NULL
                  AND (leased_until IS NULL OR leased_until <= $1)
                ORDER BY created_at, id
                LIMIT $3
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, recipient_id, sender_id, notification_type, related_entity_key, created_at
            "#,
        )
        .bind(now)
        .bind(now + lease)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.sort_by_key(|row| (row.created_at, row.id));
        rows.into_iter().map(NotificationIntent::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn mark_processed(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<()> {
        sqlx::query(
            "UPDATE notification_outbox SET processed_at = $2, leased_until = NULL WHERE id = $1",
        )
        .bind(id.into_inner())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn pending_count(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notification_outbox WHERE processed_at IS NULL",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
