//! Feed hub - per-recipient change signals for live notification feeds
//!
//! A signal carries no payload: subscribers re-read their feed when woken.
//! Channels are created on first subscription and removed when the last
//! [`FeedSubscription`] for a recipient is dropped.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast::{self, error::RecvError};

use binge_core::Snowflake;

/// Buffered signals per recipient; a lagging subscriber still re-reads once
const FEED_CHANNEL_CAPACITY: usize = 16;

#[derive(Clone, Default)]
pub struct FeedHub {
    channels: Arc<DashMap<Snowflake, broadcast::Sender<()>>>,
}

impl FeedHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscription woken after every write touching `recipient_id`'s feed
    pub fn subscribe(&self, recipient_id: Snowflake) -> FeedSubscription {
        let receiver = self
            .channels
            .entry(recipient_id)
            .or_insert_with(|| broadcast::channel(FEED_CHANNEL_CAPACITY).0)
            .subscribe();

        FeedSubscription {
            receiver: Some(receiver),
            hub: self.clone(),
            recipient_id,
        }
    }

    /// Wake every subscriber of `recipient_id`
    pub fn signal(&self, recipient_id: Snowflake) {
        let delivered = self
            .channels
            .get(&recipient_id)
            .map(|sender| sender.send(()).is_ok());

        if delivered == Some(false) {
            self.channels
                .remove_if(&recipient_id, |_, sender| sender.receiver_count() == 0);
        }
    }

    /// Live subscribers for `recipient_id`
    pub fn subscriber_count(&self, recipient_id: Snowflake) -> usize {
        self.channels
            .get(&recipient_id)
            .map_or(0, |sender| sender.receiver_count())
    }
}

/// One recipient's live signal; dropping it releases the hub entry once unused
pub struct FeedSubscription {
    receiver: Option<broadcast::Receiver<()>>,
    hub: FeedHub,
    recipient_id: Snowflake,
}

impl FeedSubscription {
    /// Wait for the next change, `false` once the hub side is gone
    ///
    /// Lagging behind counts as a change: the feed is re-read either way.
    pub async fn changed(&mut self) -> bool {
        let Some(receiver) = self.receiver.as_mut() else {
            return false;
        };
        match receiver.recv().await {
            Ok(()) | Err(RecvError::Lagged(_)) => true,
            Err(RecvError::Closed) => false,
        }
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        drop(self.receiver.take());
        self.hub
            .channels
            .remove_if(&self.recipient_id, |_, sender| sender.receiver_count() == 0);
    }
}

impl std::fmt::Debug for FeedSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedSubscription")
            .field("recipient_id", &self.recipient_id)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for FeedHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedHub")
            .field("channels", &self.channels.len())
            .finish()
    }
}
