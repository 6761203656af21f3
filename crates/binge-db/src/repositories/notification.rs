//! PostgreSQL implementation of NotificationRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use binge_core::entities::Notification;
use binge_core::traits::{NotificationRepository, RepoResult};
use binge_core::value_objects::{GroupKey, Snowflake};

use crate::mappers::NotificationInsert;
use crate::models::NotificationModel;

use super::error::{escape_like, map_db_error};

const COLUMNS: &str =
    "id, recipient_id, notification_type, sender_id, related_entity_key, message, read, created_at";

/// PostgreSQL implementation of NotificationRepository
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    /// Create a new PgNotificationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_entities(rows: Vec<NotificationModel>) -> RepoResult<Vec<Notification>> {
    rows.into_iter().map(Notification::try_from).collect()
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Notification>> {
        let result = sqlx::query_as::<_, NotificationModel>(&format!(
            "SELECT {COLUMNS} FROM notifications WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Notification::try_from).transpose()
    }

    #[instrument(skip(self), fields(group = %group))]
    async fn find_recent_in_group(
        &self,
        recipient_id: Snowflake,
        group: &GroupKey,
        since: DateTime<Utc>,
    ) -> RepoResult<Option<Notification>> {
        let result = match group {
            GroupKey::Entity {
                notification_type,
                entity_key,
            } => {
                sqlx::query_as::<_, NotificationModel>(&format!(
                    r#"
                    SELECT {COLUMNS} FROM notifications
                    WHERE recipient_id = $1 AND notification_type = $2
                      AND related_entity_key = $3 AND created_at >= $4
                    ORDER BY created_at DESC, id DESC
                    LIMIT 1
                    "#
                ))
                .bind(recipient_id.into_inner())
                .bind(notification_type.as_str())
                .bind(entity_key.as_str())
                .bind(since)
                .fetch_optional(&self.pool)
                .await
            }
            GroupKey::Sender {
                notification_type,
                sender_id,
            } => {
                sqlx::query_as::<_, NotificationModel>(&format!(
                    r#"
                    SELECT {COLUMNS} FROM notifications
                    WHERE recipient_id = $1 AND notification_type = $2
                      AND related_entity_key IS NULL AND sender_id = $3 AND created_at >= $4
                    ORDER BY created_at DESC, id DESC
                    LIMIT 1
                    "#
                ))
                .bind(recipient_id.into_inner())
                .bind(notification_type.as_str())
                .bind(sender_id.into_inner())
                .bind(since)
                .fetch_optional(&self.pool)
                .await
            }
            GroupKey::Single(_) => return Ok(None),
        }
        .map_err(map_db_error)?;

        result.map(Notification::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_by_recipient(
        &self,
        recipient_id: Snowflake,
        limit: Option<i64>,
    ) -> RepoResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationModel>(&format!(
            r#"
            SELECT {COLUMNS} FROM notifications
            WHERE recipient_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#
        ))
        .bind(recipient_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        into_entities(rows)
    }

    #[instrument(skip(self, notification), fields(id = %notification.id))]
    async fn create(&self, notification: &Notification) -> RepoResult<()> {
        let row = NotificationInsert::new(notification);
        sqlx::query(
            r#"
            INSERT INTO notifications
                (id, recipient_id, notification_type, sender_id, related_entity_key, message, read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(row.id)
        .bind(row.recipient_id)
        .bind(row.notification_type)
        .bind(row.sender_id)
        .bind(row.related_entity_key)
        .bind(row.message)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, message))]
    async fn refresh(&self, id: Snowflake, message: &str, at: DateTime<Utc>) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET message = $2, read = FALSE, created_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .bind(message)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn mark_all_read(&self, recipient_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE recipient_id = $1 AND read = FALSE",
        )
        .bind(recipient_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delete_many(&self, recipient_id: Snowflake, ids: &[Snowflake]) -> RepoResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ids: Vec<i64> = ids.iter().map(|id| id.into_inner()).collect();
        let result = sqlx::query(
            "DELETE FROM notifications WHERE recipient_id = $1 AND id = ANY($2)",
        )
        .bind(recipient_id.into_inner())
        .bind(&ids)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_by_related_entity(&self, entity_key: &str) -> RepoResult<Vec<Snowflake>> {
        let nested = format!("{}/%", escape_like(entity_key));
        let recipients = sqlx::query_scalar::<_, i64>(
            r#"
            WITH removed AS (
                DELETE FROM notifications
                WHERE related_entity_key = $1 OR related_entity_key LIKE $2 ESCAPE '\'
                RETURNING recipient_id
            )
            SELECT DISTINCT recipient_id FROM removed
            "#,
        )
        .bind(entity_key)
        .bind(nested)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(recipients.into_iter().map(Snowflake::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgNotificationRepository>();
    }
}
