//! Notification composer - turns a qualifying event into a feed row
//!
//! Rules, in order:
//! 1. a user is never notified about their own action;
//! 2. reaction and follow events inside the cooldown window are dropped;
//! 3. the newest row of the same group inside the merge window is refreshed
//!    (new message, unread, `created_at = now`);
//! 4. otherwise a new row is inserted.
//!
//! The composer runs after the triggering action has committed, so it never
//! returns an error: failures are logged and reported as [`ComposeOutcome::Failed`].

use tracing::{debug, info, instrument, warn};

use binge_core::{CooldownKey, Notification, NotificationEvent, Snowflake};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// What happened to a composed event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeOutcome {
    Created(Snowflake),
    Merged(Snowflake),
    SelfNotification,
    Suppressed,
    Failed,
}

impl ComposeOutcome {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Merged(_) => "merged",
            Self::SelfNotification => "self_notification",
            Self::Suppressed => "suppressed",
            Self::Failed => "failed",
        }
    }

    /// Row written by this compose, if any
    pub const fn notification_id(&self) -> Option<Snowflake> {
        match self {
            Self::Created(id) | Self::Merged(id) => Some(*id),
            _ => None,
        }
    }
}

/// Composer service
pub struct NotificationComposer<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NotificationComposer<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, event), fields(
        recipient_id = %event.recipient_id,
        notification_type = %event.notification_type,
    ))]
    pub async fn compose_or_merge(&self, event: &NotificationEvent) -> ComposeOutcome {
        if event.is_self_notification() {
            debug!("Skipping self notification");
            return ComposeOutcome::SelfNotification;
        }

        match self.try_compose(event).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Failed to compose notification");
                ComposeOutcome::Failed
            }
        }
    }

    async fn try_compose(&self, event: &NotificationEvent) -> ServiceResult<ComposeOutcome> {
        let cooldown_key = CooldownKey::new(
            event.recipient_id,
            event.related_entity_key.as_deref(),
            event.sender_id,
            event.notification_type,
        );

        // Content-bearing events bypass the cooldown so the merged row shows the latest text
        if !event.notification_type.carries_content()
            && self.ctx.cooldown().should_suppress(&cooldown_key).await
        {
            debug!("Suppressed by cooldown");
            return Ok(ComposeOutcome::Suppressed);
        }

        let now = self.ctx.clock().now();
        let since = now - self.ctx.notification_config().merge_window();
        let repo = self.ctx.notification_repo();

        let existing = match event.group_key() {
            Some(group) => {
                repo.find_recent_in_group(event.recipient_id, &group, since)
                    .await?
            }
            None => None,
        };

        // The row may be deleted between find and refresh
        let mut merged = None;
        if let Some(row) = existing {
            if repo.refresh(row.id, &event.message, now).await? {
                merged = Some(row.id);
            }
        }

        let outcome = match merged {
            Some(id) => {
                info!(notification_id = %id, "Notification merged");
                ComposeOutcome::Merged(id)
            }
            None => {
                let notification = Notification::new(self.ctx.generate_id(), event, now);
                repo.create(&notification).await?;
                info!(notification_id = %notification.id, "Notification created");
                ComposeOutcome::Created(notification.id)
            }
        };

        self.ctx.cooldown().mark_attempted(&cooldown_key).await;
        self.ctx.feed_hub().signal(event.recipient_id);

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::harness;
    use binge_core::{NotificationRepository, NotificationType};
    use chrono::Duration;

    const ALICE: Snowflake = Snowflake::new(1);
    const BOB: Snowflake = Snowflake::new(2);

    fn comment(message: &str) -> NotificationEvent {
        NotificationEvent::new(ALICE, NotificationType::ReviewComment, message)
            .with_sender(BOB)
            .with_entity("review:9")
    }

    fn list_like() -> NotificationEvent {
        NotificationEvent::new(ALICE, NotificationType::ListReaction, "Bob liked your list")
            .with_sender(BOB)
            .with_entity("list:10")
    }

    #[tokio::test]
    async fn test_self_notification_writes_nothing() {
        let h = harness();
        let event = NotificationEvent::new(ALICE, NotificationType::ListReaction, "x")
            .with_sender(ALICE)
            .with_entity("list:10");

        let outcome = NotificationComposer::new(&h.ctx).compose_or_merge(&event).await;
        assert_eq!(outcome, ComposeOutcome::SelfNotification);
        assert!(h.store.list_by_recipient(ALICE, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_merge_within_window_refreshes_row() {
        let h = harness();
        let composer = NotificationComposer::new(&h.ctx);

        let first = composer.compose_or_merge(&comment("first")).await;
        let id = first.notification_id().unwrap();
        h.store.mark_read(id).await.unwrap();

        h.clock.advance(Duration::minutes(10));
        let second = composer.compose_or_merge(&comment("second")).await;
        assert_eq!(second, ComposeOutcome::Merged(id));

        let rows = h.store.list_by_recipient(ALICE, None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].message, "second");
        assert!(!rows[0].read);
        assert_eq!(rows[0].created_at, h.ctx.clock().now());
    }

    #[tokio::test]
    async fn test_expired_window_creates_new_row() {
        let h = harness();
        let composer = NotificationComposer::new(&h.ctx);

        assert!(matches!(
            composer.compose_or_merge(&comment("first")).await,
            ComposeOutcome::Created(_)
        ));
        h.clock.advance(Duration::hours(25));
        assert!(matches!(
            composer.compose_or_merge(&comment("second")).await,
            ComposeOutcome::Created(_)
        ));

        assert_eq!(h.store.list_by_recipient(ALICE, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cooldown_suppresses_repeated_reaction() {
        let h = harness();
        let composer = NotificationComposer::new(&h.ctx);

        assert!(matches!(
            composer.compose_or_merge(&list_like()).await,
            ComposeOutcome::Created(_)
        ));
        h.clock.advance(Duration::minutes(5));
        assert_eq!(
            composer.compose_or_merge(&list_like()).await,
            ComposeOutcome::Suppressed
        );

        h.clock.advance(Duration::minutes(31));
        assert!(matches!(
            composer.compose_or_merge(&list_like()).await,
            ComposeOutcome::Merged(_)
        ));
        assert_eq!(h.store.list_by_recipient(ALICE, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_comments_are_not_held_by_cooldown() {
        let h = harness();
        let composer = NotificationComposer::new(&h.ctx);

        composer.compose_or_merge(&comment("first")).await;
        h.clock.advance(Duration::minutes(1));
        assert!(matches!(
            composer.compose_or_merge(&comment("again")).await,
            ComposeOutcome::Merged(_)
        ));
    }

    #[tokio::test]
    async fn test_orphan_event_always_inserts() {
        let h = harness();
        let composer = NotificationComposer::new(&h.ctx);
        let event = NotificationEvent::new(ALICE, NotificationType::NewFollower, "Welcome");

        composer.compose_or_merge(&event).await;
        h.clock.advance(Duration::hours(1));
        composer.compose_or_merge(&event).await;

        assert_eq!(h.store.list_by_recipient(ALICE, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_write_signals_feed() {
        let h = harness();
        let mut subscription = h.ctx.feed_hub().subscribe(ALICE);
        NotificationComposer::new(&h.ctx)
            .compose_or_merge(&comment("hi"))
            .await;
        assert!(subscription.changed().await);
    }
}
