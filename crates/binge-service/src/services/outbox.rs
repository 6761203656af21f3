//! Outbox worker - turns committed notification intents into feed rows
//!
//! Intents are claimed in batches under a lease, composed, and marked
//! processed whatever the compose outcome. A crashed worker's lease expires
//! and another claim picks the intent up again.

use binge_common::OutboxConfig;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use binge_core::{NotificationEvent, NotificationIntent, NotificationType};

use super::composer::NotificationComposer;
use super::context::ServiceContext;
use super::error::ServiceResult;

/// Message shown for a notification of `notification_type` sent by `name`
pub fn render_message(notification_type: NotificationType, name: &str) -> String {
    match notification_type {
        NotificationType::NewFollower => format!("{name} started following you"),
        NotificationType::ReviewReaction => format!("{name} liked your review"),
        NotificationType::ListReaction => format!("{name} liked your list"),
        NotificationType::CommentReaction => format!("{name} liked your comment"),
        NotificationType::ReviewComment => format!("{name} commented on your review"),
        NotificationType::ListComment => format!("{name} commented on your list"),
        NotificationType::CommentReply => format!("{name} replied to your comment"),
    }
}

pub struct OutboxWorker {
    ctx: ServiceContext,
    config: OutboxConfig,
}

impl OutboxWorker {
    pub fn new(ctx: ServiceContext, config: OutboxConfig) -> Self {
        Self { ctx, config }
    }

    /// Process every claimable intent, returning how many were handled
    #[instrument(skip(self))]
    pub async fn drain_once(&self) -> ServiceResult<usize> {
        let outbox = self.ctx.outbox_repo();
        let mut processed = 0;

        loop {
            let batch = outbox
                .claim_pending(
                    self.config.batch_size,
                    self.ctx.clock().now(),
                    self.config.lease(),
                )
                .await?;
            let claimed = batch.len();

            for intent in batch {
                self.deliver(&intent).await;
                outbox
                    .mark_processed(intent.id, self.ctx.clock().now())
                    .await?;
                processed += 1;
            }

            if i64::try_from(claimed).unwrap_or(i64::MAX) < self.config.batch_size {
                break;
            }
        }

        if processed > 0 {
            debug!(processed, "Outbox drained");
        }
        Ok(processed)
    }

    async fn deliver(&self, intent: &NotificationIntent) {
        let name = self
            .ctx
            .display_names()
            .resolve_display_name(intent.sender_id)
            .await;
        let event = NotificationEvent::new(
            intent.recipient_id,
            intent.notification_type,
            render_message(intent.notification_type, &name),
        )
        .with_sender(intent.sender_id)
        .with_entity(intent.related_entity_key.clone());

        let outcome = NotificationComposer::new(&self.ctx)
            .compose_or_merge(&event)
            .await;
        debug!(intent_id = %intent.id, outcome = outcome.as_str(), "Intent processed");
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped
    ///
    /// Drains on every poll tick and whenever a toggle wakes the worker.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let signal = self.ctx.outbox_signal();
            let mut ticker = tokio::time::interval(self.config.poll_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(
                poll_interval_ms = self.config.poll_interval_ms,
                batch_size = self.config.batch_size,
                "Outbox worker started"
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    () = signal.notified() => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
                if *shutdown.borrow() {
                    break;
                }

                if let Err(e) = self.drain_once().await {
                    warn!(error = %e, "Outbox drain failed");
                }
            }

            info!("Outbox worker stopped");
        })
    }
}
