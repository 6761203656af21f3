//! Notification service
//!
//! Public operations over a recipient's feed: the event hook for other
//! writers, grouped snapshots and live streams, read-state changes,
//! deletion, cleanup and the entity cascade.

use futures::stream::{self, BoxStream, StreamExt};
use tracing::{info, instrument};

use binge_core::{DomainError, Notification, NotificationEvent, Snowflake, TargetKey};

use super::cleaner::NotificationCleaner;
use super::composer::{ComposeOutcome, NotificationComposer};
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::grouper::GroupedFeed;

/// Live feed: one item immediately, then one per signalled change
pub type NotificationStream<T> = BoxStream<'static, ServiceResult<T>>;

/// Notification service
pub struct NotificationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NotificationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Hook for writers outside this crate (follows, comments, replies)
    ///
    /// Never fails; see [`ComposeOutcome`] for what happened.
    pub async fn notify_on_event(&self, event: &NotificationEvent) -> ComposeOutcome {
        NotificationComposer::new(self.ctx).compose_or_merge(event).await
    }

    /// [`Self::notify_on_event`] for events arriving over the wire
    ///
    /// A related entity must be a registered target owned by the recipient.
    #[instrument(skip(self, event), fields(recipient_id = %event.recipient_id))]
    pub async fn report_event(&self, event: &NotificationEvent) -> ServiceResult<ComposeOutcome> {
        if let Some(entity_key) = event.related_entity_key.as_deref() {
            let key = TargetKey::parse(entity_key)?;
            self.require_owner(&key, event.recipient_id).await?;
        }
        Ok(self.notify_on_event(event).await)
    }

    /// Raw rows of a recipient's feed, re-read after every change
    ///
    /// Dropping the stream only releases the subscription.
    pub fn get_notification_feed(
        &self,
        recipient_id: Snowflake,
    ) -> NotificationStream<Vec<Notification>> {
        let repo = self.ctx.notification_repo_handle();
        // Subscribe before the first read so no signal is missed
        let signals = self.ctx.feed_hub().subscribe(recipient_id);

        stream::unfold((signals, true), move |(mut signals, first)| {
            let repo = repo.clone();
            async move {
                if !first && !signals.changed().await {
                    return None;
                }
                let batch = repo
                    .list_by_recipient(recipient_id, None)
                    .await
                    .map_err(ServiceError::from);
                Some((batch, (signals, false)))
            }
        })
        .boxed()
    }

    /// [`Self::get_notification_feed`] mapped through the grouper
    pub fn grouped_feed(&self, recipient_id: Snowflake) -> NotificationStream<GroupedFeed> {
        self.get_notification_feed(recipient_id)
            .map(|batch| batch.map(|rows| GroupedFeed::from_raw(&rows)))
            .boxed()
    }

    /// Grouped snapshot with unread count
    #[instrument(skip(self))]
    pub async fn list_grouped(&self, recipient_id: Snowflake) -> ServiceResult<GroupedFeed> {
        let rows = self
            .ctx
            .notification_repo()
            .list_by_recipient(recipient_id, None)
            .await?;
        Ok(GroupedFeed::from_raw(&rows))
    }

    #[instrument(skip(self))]
    pub async fn mark_read(&self, id: Snowflake, actor_id: Snowflake) -> ServiceResult<()> {
        let notification = self.owned_by(id, actor_id).await?;
        if !notification.read {
            self.ctx.notification_repo().mark_read(id).await?;
            self.ctx.feed_hub().signal(actor_id);
        }
        Ok(())
    }

    /// Mark every row of `recipient_id` read, returning how many changed
    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, recipient_id: Snowflake) -> ServiceResult<u64> {
        let updated = self
            .ctx
            .notification_repo()
            .mark_all_read(recipient_id)
            .await?;
        if updated > 0 {
            self.ctx.feed_hub().signal(recipient_id);
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_notification(
        &self,
        id: Snowflake,
        actor_id: Snowflake,
    ) -> ServiceResult<()> {
        self.owned_by(id, actor_id).await?;
        if self.ctx.notification_repo().delete(id).await? {
            info!(notification_id = %id, "Notification deleted");
            self.ctx.feed_hub().signal(actor_id);
        }
        Ok(())
    }

    /// Remove superseded rows; see [`NotificationCleaner::cleanup`]
    pub async fn cleanup(&self, recipient_id: Snowflake) -> u64 {
        NotificationCleaner::new(self.ctx).cleanup(recipient_id).await
    }

    /// Cascade for a deleted entity: removes rows related to it or nested under it
    ///
    /// Only the entity's owner may run it. Returns the number of recipients
    /// whose feed changed.
    #[instrument(skip(self), fields(entity_key = %entity))]
    pub async fn delete_for_entity(
        &self,
        entity: &TargetKey,
        actor_id: Snowflake,
    ) -> ServiceResult<usize> {
        self.require_owner(entity, actor_id).await?;

        let recipients = self
            .ctx
            .notification_repo()
            .delete_by_related_entity(&entity.to_string())
            .await?;
        for recipient_id in &recipients {
            self.ctx.feed_hub().signal(*recipient_id);
        }

        info!(recipients = recipients.len(), "Entity notifications removed");
        Ok(recipients.len())
    }

    /// A nested key is owned by its own registration, else by its root entity
    async fn require_owner(&self, key: &TargetKey, user_id: Snowflake) -> ServiceResult<()> {
        let repo = self.ctx.reaction_repo();
        let mut target = repo.find_target(key).await?;
        if target.is_none() && key.parent_key().is_some() {
            target = repo.find_target(&key.root()).await?;
        }
        let target = target.ok_or_else(|| DomainError::TargetNotFound(key.to_string()))?;

        if !target.is_owned_by(user_id) {
            return Err(DomainError::PermissionDenied(format!(
                "{key} belongs to another user"
            ))
            .into());
        }
        Ok(())
    }

    async fn owned_by(&self, id: Snowflake, actor_id: Snowflake) -> ServiceResult<Notification> {
        let notification = self
            .ctx
            .notification_repo()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotificationNotFound(id))?;

        if notification.recipient_id != actor_id {
            return Err(DomainError::PermissionDenied(format!(
                "notification {id} belongs to another user"
            ))
            .into());
        }
        Ok(notification)
    }
}
