//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation (PostgreSQL or the in-memory store).

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::entities::{
    Notification, NotificationIntent, Reaction, ReactionKind, Target, ToggleOutcome,
    ToggleRequest,
};
use crate::error::DomainError;
use crate::value_objects::{GroupKey, Snowflake, TargetKey};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Reaction Repository
// ============================================================================

/// Sole writer of reaction membership and the denormalized counter
#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Register a reactable target; a no-op if the key already exists
    async fn register_target(&self, target: &Target) -> RepoResult<()>;

    /// Find target by key
    async fn find_target(&self, key: &TargetKey) -> RepoResult<Option<Target>>;

    /// Find a single reaction
    async fn find(
        &self,
        key: &TargetKey,
        user_id: Snowflake,
        kind: ReactionKind,
    ) -> RepoResult<Option<Reaction>>;

    /// Count reaction rows for a target (the counter's ground truth)
    async fn count_members(&self, key: &TargetKey, kind: ReactionKind) -> RepoResult<i64>;

    /// Atomically flip membership, adjust the counter, and record the intent
    ///
    /// Conflicts are retried internally; exhausting the retry budget yields
    /// [`DomainError::TransientStoreConflict`].
    async fn toggle(&self, request: &ToggleRequest) -> RepoResult<ToggleOutcome>;
}

// ============================================================================
// Notification Repository
// ============================================================================

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Find notification by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Notification>>;

    /// Newest notification in a group created at or after `since`
    async fn find_recent_in_group(
        &self,
        recipient_id: Snowflake,
        group: &GroupKey,
        since: DateTime<Utc>,
    ) -> RepoResult<Option<Notification>>;

    /// All notifications for a recipient, newest first
    async fn list_by_recipient(
        &self,
        recipient_id: Snowflake,
        limit: Option<i64>,
    ) -> RepoResult<Vec<Notification>>;

    /// Insert a new notification
    async fn create(&self, notification: &Notification) -> RepoResult<()>;

    /// Merge-refresh: overwrite message, reset to unread, bump `created_at`
    ///
    /// Returns `false` if the row no longer exists.
    async fn refresh(&self, id: Snowflake, message: &str, at: DateTime<Utc>)
        -> RepoResult<bool>;

    /// Mark one notification read; `false` if absent
    async fn mark_read(&self, id: Snowflake) -> RepoResult<bool>;

    /// Mark every notification of a recipient read, returning the number changed
    async fn mark_all_read(&self, recipient_id: Snowflake) -> RepoResult<u64>;

    /// Delete one notification; `false` if absent
    async fn delete(&self, id: Snowflake) -> RepoResult<bool>;

    /// Delete the given rows of one recipient, returning the number deleted
    async fn delete_many(&self, recipient_id: Snowflake, ids: &[Snowflake]) -> RepoResult<u64>;

    /// Delete rows whose related entity is `entity_key` or nested under it
    ///
    /// Returns the distinct recipients that lost a row.
    async fn delete_by_related_entity(&self, entity_key: &str) -> RepoResult<Vec<Snowflake>>;
}

// ============================================================================
// Outbox Repository
// ============================================================================

#[async_trait]
pub trait OutboxRepository: Send + Sync {
    /// Lease up to `limit` unprocessed intents, oldest first
    ///
    /// A leased intent is not handed out again until `lease` elapses, so a
    /// crashed worker's batch is eventually picked up by another.
    async fn claim_pending(
        &self,
        limit: i64,
        now: DateTime<Utc>,
        lease: Duration,
    ) -> RepoResult<Vec<NotificationIntent>>;

    /// Mark an intent as processed
    async fn mark_processed(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<()>;

    /// Number of intents not yet processed
    async fn pending_count(&self) -> RepoResult<i64>;
}
