//! Ports for collaborators that sit outside the store

use async_trait::async_trait;

use crate::value_objects::{CooldownKey, Snowflake};

/// Name used in messages when a user's profile cannot be resolved
pub const FALLBACK_DISPLAY_NAME: &str = "Someone";

// ============================================================================
// Cooldown Guard
// ============================================================================

/// Short-lived suppression of repeated composition attempts
///
/// Implementations never fail: a backend that cannot answer reports
/// "not suppressed" and logs the problem.
#[async_trait]
pub trait CooldownGuard: Send + Sync {
    /// Whether an attempt for `key` happened within the cooldown window
    async fn should_suppress(&self, key: &CooldownKey) -> bool;

    /// Record an attempt for `key` now
    async fn mark_attempted(&self, key: &CooldownKey);
}

// ============================================================================
// Display Name Resolver
// ============================================================================

#[async_trait]
pub trait DisplayNameResolver: Send + Sync {
    /// Human-readable name for `user_id`, falling back to [`FALLBACK_DISPLAY_NAME`]
    async fn resolve_display_name(&self, user_id: Snowflake) -> String;
}
