use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tracing::instrument;

use binge_core::entities::{
    Notification, NotificationIntent, Reaction, ReactionKind, Target, ToggleOutcome,
    ToggleRequest,
};
use binge_core::error::DomainError;
use binge_core::traits::{
    DisplayNameResolver, NotificationRepository, OutboxRepository, ReactionRepository,
    RepoResult, FALLBACK_DISPLAY_NAME,
};
use binge_core::value_objects::{GroupKey, Snowflake, TargetKey};

use crate::retry::{run_with_retry, AttemptError, RetryPolicy};

type ReactionId = (TargetKey, Snowflake, ReactionKind);

struct TargetRow {
    target: Target,
    /// Bumped by every committed toggle
    version: u64,
}

struct OutboxRow {
    intent: NotificationIntent,
    leased_until: Option<DateTime<Utc>>,
    processed_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Tables {
    targets: HashMap<TargetKey, TargetRow>,
    reactions: HashMap<ReactionId, DateTime<Utc>>,
    notifications: HashMap<Snowflake, Notification>,
    outbox: BTreeMap<Snowflake, OutboxRow>,
    profiles: HashMap<Snowflake, String>,
}

/// Process-memory implementation of the store ports
pub struct MemoryStore {
    tables: Mutex<Tables>,
    retry: RetryPolicy,
    conflicts: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            retry: RetryPolicy::default(),
            conflicts: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Seed a profile name for [`DisplayNameResolver`]
    pub fn set_display_name(&self, user_id: Snowflake, name: impl Into<String>) {
        self.tables.lock().profiles.insert(user_id, name.into());
    }

    /// Number of toggle attempts that lost a version check
    pub fn conflict_count(&self) -> u64 {
        self.conflicts.load(Ordering::Relaxed)
    }

    /// Every `(target, stored counter, actual member count)` triple
    pub fn counter_audit(&self) -> Vec<(TargetKey, i64, i64)> {
        let tables = self.tables.lock();
        tables
            .targets
            .iter()
            .map(|(key, row)| {
                let members = tables.reactions.keys().filter(|(k, _, _)| k == key).count();
                (key.clone(), row.target.reaction_count, members as i64)
            })
            .collect()
    }

    async fn toggle_once(&self, request: &ToggleRequest) -> Result<ToggleOutcome, AttemptError> {
        let id: ReactionId = (request.target_key.clone(), request.user_id, request.kind);
        let not_found = || DomainError::TargetNotFound(request.target_key.to_string());

        let (version, active, count) = {
            let tables = self.tables.lock();
            let row = tables.targets.get(&request.target_key).ok_or_else(not_found)?;
            (
                row.version,
                tables.reactions.contains_key(&id),
                row.target.reaction_count,
            )
        };

        let desired = request.mode.resolve(active);
        if desired == active {
            return Ok(ToggleOutcome {
                active,
                count,
                changed: false,
                intent: None,
            });
        }

        // Read and write are separate round trips, as with a remote store.
        tokio::task::yield_now().await;

        let mut tables = self.tables.lock();
        let Tables {
            targets,
            reactions,
            outbox,
            ..
        } = &mut *tables;
        let row = targets.get_mut(&request.target_key).ok_or_else(not_found)?;
        if row.version != version {
            self.conflicts.fetch_add(1, Ordering::Relaxed);
            return Err(AttemptError::Conflict(format!(
                "{} changed since read",
                request.target_key
            )));
        }

        if desired {
            reactions.insert(id, request.requested_at);
            row.target.reaction_count += 1;
        } else {
            reactions.remove(&id);
            row.target.reaction_count -= 1;
        }
        row.version += 1;

        let intent = if desired {
            NotificationIntent::for_reaction(
                request.intent_id,
                row.target.owner_id,
                request.user_id,
                &request.target_key,
                request.requested_at,
            )
        } else {
            None
        };
        if let Some(intent) = &intent {
            outbox.insert(
                intent.id,
                OutboxRow {
                    intent: intent.clone(),
                    leased_until: None,
                    processed_at: None,
                },
            );
        }

        Ok(ToggleOutcome {
            active: desired,
            count: row.target.reaction_count,
            changed: true,
            intent,
        })
    }
}

fn newest_first(a: &Notification, b: &Notification) -> std::cmp::Ordering {
    b.recency().cmp(&a.recency())
}

// ============================================================================
// Reactions
// ============================================================================

#[async_trait]
impl ReactionRepository for MemoryStore {
    async fn register_target(&self, target: &Target) -> RepoResult<()> {
        self.tables
            .lock()
            .targets
            .entry(target.key.clone())
            .or_insert_with(|| TargetRow {
                target: Target::new(target.key.clone(), target.owner_id),
                version: 0,
            });
        Ok(())
    }

    async fn find_target(&self, key: &TargetKey) -> RepoResult<Option<Target>> {
        Ok(self
            .tables
            .lock()
            .targets
            .get(key)
            .map(|row| row.target.clone()))
    }

    async fn find(
        &self,
        key: &TargetKey,
        user_id: Snowflake,
        kind: ReactionKind,
    ) -> RepoResult<Option<Reaction>> {
        let tables = self.tables.lock();
        Ok(tables
            .reactions
            .get(&(key.clone(), user_id, kind))
            .map(|created_at| Reaction {
                target_key: key.clone(),
                user_id,
                kind,
                created_at: *created_at,
            }))
    }

    async fn count_members(&self, key: &TargetKey, kind: ReactionKind) -> RepoResult<i64> {
        let tables = self.tables.lock();
        let count = tables
            .reactions
            .keys()
            .filter(|(k, _, reaction_kind)| k == key && *reaction_kind == kind)
            .count();
        Ok(count as i64)
    }

    #[instrument(skip(self, request), fields(target = %request.target_key, user_id = %request.user_id))]
    async fn toggle(&self, request: &ToggleRequest) -> RepoResult<ToggleOutcome> {
        run_with_retry(&self.retry, "reaction_toggle", |_| self.toggle_once(request)).await
    }
}

// ============================================================================
// Notifications
// ============================================================================

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Notification>> {
        Ok(self.tables.lock().notifications.get(&id).cloned())
    }

    async fn find_recent_in_group(
        &self,
        recipient_id: Snowflake,
        group: &GroupKey,
        since: DateTime<Utc>,
    ) -> RepoResult<Option<Notification>> {
        if matches!(group, GroupKey::Single(_)) {
            return Ok(None);
        }
        let tables = self.tables.lock();
        Ok(tables
            .notifications
            .values()
            .filter(|n| {
                n.recipient_id == recipient_id && n.created_at >= since && n.group_key() == *group
            })
            .max_by_key(|n| n.recency())
            .cloned())
    }

    async fn list_by_recipient(
        &self,
        recipient_id: Snowflake,
        limit: Option<i64>,
    ) -> RepoResult<Vec<Notification>> {
        let mut rows: Vec<Notification> = self
            .tables
            .lock()
            .notifications
            .values()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect();
        rows.sort_by(newest_first);
        if let Some(limit) = limit {
            rows.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        }
        Ok(rows)
    }

    async fn create(&self, notification: &Notification) -> RepoResult<()> {
        let mut tables = self.tables.lock();
        if tables.notifications.contains_key(&notification.id) {
            return Err(DomainError::DatabaseError(format!(
                "duplicate notification id {}",
                notification.id
            )));
        }
        tables
            .notifications
            .insert(notification.id, notification.clone());
        Ok(())
    }

    async fn refresh(&self, id: Snowflake, message: &str, at: DateTime<Utc>) -> RepoResult<bool> {
        let mut tables = self.tables.lock();
        Ok(match tables.notifications.get_mut(&id) {
            Some(n) => {
                n.message = message.to_string();
                n.read = false;
                n.created_at = at;
                true
            }
            None => false,
        })
    }

    async fn mark_read(&self, id: Snowflake) -> RepoResult<bool> {
        let mut tables = self.tables.lock();
        Ok(match tables.notifications.get_mut(&id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        })
    }

    async fn mark_all_read(&self, recipient_id: Snowflake) -> RepoResult<u64> {
        let mut tables = self.tables.lock();
        let mut changed = 0;
        for n in tables
            .notifications
            .values_mut()
            .filter(|n| n.recipient_id == recipient_id && !n.read)
        {
            n.read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<bool> {
        Ok(self.tables.lock().notifications.remove(&id).is_some())
    }

    async fn delete_many(&self, recipient_id: Snowflake, ids: &[Snowflake]) -> RepoResult<u64> {
        let mut tables = self.tables.lock();
        let mut removed = 0;
        for id in ids {
            if tables
                .notifications
                .get(id)
                .is_some_and(|n| n.recipient_id == recipient_id)
            {
                tables.notifications.remove(id);
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn delete_by_related_entity(&self, entity_key: &str) -> RepoResult<Vec<Snowflake>> {
        let mut tables = self.tables.lock();
        let mut recipients = BTreeSet::new();
        tables.notifications.retain(|_, n| {
            if n.relates_to(entity_key) {
                recipients.insert(n.recipient_id);
                false
            } else {
                true
            }
        });
        Ok(recipients.into_iter().collect())
    }
}

// ============================================================================
// Outbox
// ============================================================================

#[async_trait]
impl OutboxRepository for MemoryStore {
    async fn claim_pending(
        &self,
        limit: i64,
        now: DateTime<Utc>,
        lease: Duration,
    ) -> RepoResult<Vec<NotificationIntent>> {
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let mut tables = self.tables.lock();
        let mut claimable: Vec<&mut OutboxRow> = tables
            .outbox
            .values_mut()
            .filter(|row| {
                row.processed_at.is_none() && row.leased_until.map_or(true, |until| until <= now)
            })
            .collect();
        claimable.sort_by_key(|row| (row.intent.created_at, row.intent.id));

        Ok(claimable
            .into_iter()
            .take(limit)
            .map(|row| {
                row.leased_until = Some(now + lease);
                row.intent.clone()
            })
            .collect())
    }

    async fn mark_processed(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<()> {
        if let Some(row) = self.tables.lock().outbox.get_mut(&id) {
            row.processed_at = Some(at);
            row.leased_until = None;
        }
        Ok(())
    }

    async fn pending_count(&self) -> RepoResult<i64> {
        let tables = self.tables.lock();
        Ok(tables
            .outbox
            .values()
            .filter(|row| row.processed_at.is_none())
            .count() as i64)
    }
}

// ============================================================================
// Profiles
// ============================================================================

#[async_trait]
impl DisplayNameResolver for MemoryStore {
    async fn resolve_display_name(&self, user_id: Snowflake) -> String {
        self.tables
            .lock()
            .profiles
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string())
    }
}
