//! Notification cleaner - physically removes superseded rows

use tracing::{info, instrument, warn};

use binge_core::Snowflake;

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::grouper;

pub struct NotificationCleaner<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NotificationCleaner<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Keep only the newest row of each group for `recipient_id`
    ///
    /// Works from a single snapshot, so rows written after it are left alone.
    /// Returns the number of rows deleted; a failure is logged and reported as 0.
    #[instrument(skip(self))]
    pub async fn cleanup(&self, recipient_id: Snowflake) -> u64 {
        match self.try_cleanup(recipient_id).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(error = %e, "Notification cleanup failed");
                0
            }
        }
    }

    async fn try_cleanup(&self, recipient_id: Snowflake) -> ServiceResult<u64> {
        let repo = self.ctx.notification_repo();
        let snapshot = repo.list_by_recipient(recipient_id, None).await?;
        let doomed = grouper::superseded(&snapshot);
        if doomed.is_empty() {
            return Ok(0);
        }

        let removed = repo.delete_many(recipient_id, &doomed).await?;
        if removed > 0 {
            self.ctx.feed_hub().signal(recipient_id);
        }

        info!(removed, snapshot = snapshot.len(), "Superseded notifications removed");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::composer::NotificationComposer;
    use crate::services::test_support::{harness, Harness};
    use binge_core::{Notification, NotificationEvent, NotificationRepository, NotificationType};
    use chrono::Duration;

    const ALICE: Snowflake = Snowflake::new(1);

    async fn seed(h: &Harness, id: i64, entity: &str, minutes_ago: i64) {
        let event = NotificationEvent::new(ALICE, NotificationType::ReviewComment, "c")
            .with_sender(Snowflake::new(2))
            .with_entity(entity);
        let row = Notification::new(
            Snowflake::new(id),
            &event,
            h.ctx.clock().now() - Duration::minutes(minutes_ago),
        );
        h.store.create(&row).await.unwrap();
    }

    #[tokio::test]
    async fn test_cleanup_keeps_newest_per_group() {
        let h = harness();
        seed(&h, 10, "review:1", 30).await;
        seed(&h, 11, "review:1", 20).await;
        seed(&h, 12, "review:1", 10).await;
        seed(&h, 13, "review:2", 40).await;

        let removed = NotificationCleaner::new(&h.ctx).cleanup(ALICE).await;
        assert_eq!(removed, 2);

        let mut ids: Vec<i64> = h
            .store
            .list_by_recipient(ALICE, None)
            .await
            .unwrap()
            .iter()
            .map(|n| n.id.into_inner())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![12, 13]);
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let h = harness();
        seed(&h, 10, "review:1", 30).await;
        seed(&h, 11, "review:1", 20).await;

        let cleaner = NotificationCleaner::new(&h.ctx);
        assert_eq!(cleaner.cleanup(ALICE).await, 1);
        assert_eq!(cleaner.cleanup(ALICE).await, 0);
        assert_eq!(h.store.list_by_recipient(ALICE, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_leaves_merged_feed_untouched() {
        let h = harness();
        let event = NotificationEvent::new(ALICE, NotificationType::ListComment, "one")
            .with_sender(Snowflake::new(2))
            .with_entity("list:4");
        let composer = NotificationComposer::new(&h.ctx);
        composer.compose_or_merge(&event).await;
        composer.compose_or_merge(&event).await;

        assert_eq!(NotificationCleaner::new(&h.ctx).cleanup(ALICE).await, 0);
    }
}
