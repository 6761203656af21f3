//! PostgreSQL implementation of ReactionRepository

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use binge_core::entities::{
    NotificationIntent, Reaction, ReactionKind, Target, ToggleOutcome, ToggleRequest,
};
use binge_core::error::DomainError;
use binge_core::traits::{ReactionRepository, RepoResult};
use binge_core::value_objects::{Snowflake, TargetKey};

use crate::mappers::OutboxInsert;
use crate::models::{ReactionModel, TargetModel};
use crate::retry::{run_with_retry, AttemptError, RetryPolicy};

use super::error::{classify_attempt_error, map_db_error};

/// PostgreSQL implementation of ReactionRepository
#[derive(Clone)]
pub struct PgReactionRepository {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PgReactionRepository {
    /// Create a new PgReactionRepository
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// One attempt of the toggle unit; commits or rolls back as a whole
    async fn toggle_once(&self, request: &ToggleRequest) -> Result<ToggleOutcome, AttemptError> {
        let key = request.target_key.to_string();
        let mut tx = self.pool.begin().await.map_err(classify_attempt_error)?;

        let target = sqlx::query_as::<_, TargetModel>(
            r#"
            SELECT target_key, owner_id, reaction_count
            FROM reaction_targets
            WHERE target_key = $1
            FOR UPDATE
            "#,
        )
        .bind(&key)
        .fetch_optional(&mut *tx)
        .await
        .map_err(classify_attempt_error)?
        .ok_or_else(|| DomainError::TargetNotFound(key.clone()))?;

        let active: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM reactions
                WHERE target_key = $1 AND user_id = $2 AND kind = $3
            )
            "#,
        )
        .bind(&key)
        .bind(request.user_id.into_inner())
        .bind(request.kind.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_attempt_error)?;

        let desired = request.mode.resolve(active);
        if desired == active {
            tx.commit().await.map_err(classify_attempt_error)?;
            return Ok(ToggleOutcome {
                active,
                count: target.reaction_count,
                changed: false,
                intent: None,
            });
        }

        let count = if desired {
            sqlx::query(
                r#"
                INSERT INTO reactions (target_key, user_id, kind, created_at)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&key)
            .bind(request.user_id.into_inner())
            .bind(request.kind.as_str())
            .bind(request.requested_at)
            .execute(&mut *tx)
            .await
            .map_err(classify_attempt_error)?;
            adjust_counter(&mut tx, &key, 1).await?
        } else {
            sqlx::query(
                r#"
                DELETE FROM reactions
                WHERE target_key = $1 AND user_id = $2 AND kind = $3
                "#,
            )
            .bind(&key)
            .bind(request.user_id.into_inner())
            .bind(request.kind.as_str())
            .execute(&mut *tx)
            .await
            .map_err(classify_attempt_error)?;
            adjust_counter(&mut tx, &key, -1).await?
        };

        let intent = if desired {
            NotificationIntent::for_reaction(
                request.intent_id,
                Snowflake::new(target.owner_id),
                request.user_id,
                &request.target_key,
                request.requested_at,
            )
        } else {
            None
        };
        if let Some(intent) = &intent {
            let row = OutboxInsert::new(intent);
            sqlx::query(
                r#"
                INSERT INTO notification_outbox
                    (id, recipient_id, sender_id, notification_type, related_entity_key, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(row.id)
            .bind(row.recipient_id)
            .bind(row.sender_id)
            .bind(row.notification_type)
            .bind(row.related_entity_key)
            .bind(intent.created_at)
            .execute(&mut *tx)
            .await
            .map_err(classify_attempt_error)?;
        }

        tx.commit().await.map_err(classify_attempt_error)?;

        Ok(ToggleOutcome {
            active: desired,
            count,
            changed: true,
            intent,
        })
    }
}

async fn adjust_counter(
    tx: &mut Transaction<'_, Postgres>,
    key: &str,
    delta: i64,
) -> Result<i64, AttemptError> {
    sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE reaction_targets
        SET reaction_count = reaction_count + $2
        WHERE target_key = $1
        RETURNING reaction_count
        "#,
    )
    .bind(key)
    .bind(delta)
    .fetch_one(&mut **tx)
    .await
    .map_err(classify_attempt_error)
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    #[instrument(skip(self, target), fields(target = %target.key))]
    async fn register_target(&self, target: &Target) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reaction_targets (target_key, target_type, target_id, parent_key, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (target_key) DO NOTHING
            "#,
        )
        .bind(target.key.to_string())
        .bind(target.key.target_type().as_str())
        .bind(target.key.target_id().into_inner())
        .bind(target.key.parent_key())
        .bind(target.owner_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(target = %key))]
    async fn find_target(&self, key: &TargetKey) -> RepoResult<Option<Target>> {
        let result = sqlx::query_as::<_, TargetModel>(
            r#"
            SELECT target_key, owner_id, reaction_count
            FROM reaction_targets
            WHERE target_key = $1
            "#,
        )
        .bind(key.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Target::try_from).transpose()
    }

    #[instrument(skip(self), fields(target = %key))]
    async fn find(
        &self,
        key: &TargetKey,
        user_id: Snowflake,
        kind: ReactionKind,
    ) -> RepoResult<Option<Reaction>> {
        let result = sqlx::query_as::<_, ReactionModel>(
            r#"
            SELECT target_key, user_id, kind, created_at
            FROM reactions
            WHERE target_key = $1 AND user_id = $2 AND kind = $3
            "#,
        )
        .bind(key.to_string())
        .bind(user_id.into_inner())
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Reaction::try_from).transpose()
    }

    #[instrument(skip(self), fields(target = %key))]
    async fn count_members(&self, key: &TargetKey, kind: ReactionKind) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM reactions WHERE target_key = $1 AND kind = $2
            "#,
        )
        .bind(key.to_string())
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, request), fields(target = %request.target_key, user_id = %request.user_id, mode = ?request.mode))]
    async fn toggle(&self, request: &ToggleRequest) -> RepoResult<ToggleOutcome> {
        let outcome = run_with_retry(&self.retry, "reaction_toggle", |_| {
            self.toggle_once(request)
        })
        .await?;

        debug!(active = outcome.active, count = outcome.count, "Toggle committed");
        Ok(outcome)
    }
}
