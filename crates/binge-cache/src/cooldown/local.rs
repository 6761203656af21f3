//! Per-process cooldown window

use std::sync::Arc;

use async_trait::async_trait;
use binge_core::clock::{Clock, SystemClock};
use binge_core::traits::CooldownGuard;
use binge_core::value_objects::CooldownKey;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::trace;

/// Cooldown entries kept in process memory
///
/// Entries are lost on restart and are not shared between instances.
pub struct InMemoryCooldownGuard {
    entries: DashMap<CooldownKey, DateTime<Utc>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl InMemoryCooldownGuard {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, last| now - *last < self.ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CooldownGuard for InMemoryCooldownGuard {
    async fn should_suppress(&self, key: &CooldownKey) -> bool {
        let now = self.clock.now();
        let Some(last) = self.entries.get(key).map(|entry| *entry) else {
            return false;
        };
        if now - last < self.ttl {
            trace!(key = %key.cache_key(), "Cooldown active");
            true
        } else {
            self.entries.remove_if(key, |_, at| now - *at >= self.ttl);
            false
        }
    }

    async fn mark_attempted(&self, key: &CooldownKey) {
        self.entries.insert(key.clone(), self.clock.now());
    }
}
