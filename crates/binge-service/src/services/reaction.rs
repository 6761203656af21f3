//! Reaction service
//!
//! Toggles likes on reviews, lists and comments. The repository owns the
//! atomic unit (membership, counter, outbox intent); this layer resolves the
//! actor and target and wakes the outbox worker once a unit commits.

use tracing::{debug, info, instrument};

use binge_core::{
    DomainError, ReactionKind, ReactionState, Snowflake, Target, TargetKey, ToggleMode,
    ToggleRequest,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new ReactionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a reactable target for its owner
    ///
    /// Registering an existing key is a no-op and returns the stored target.
    #[instrument(skip(self))]
    pub async fn register_target(
        &self,
        target_key: &TargetKey,
        owner_id: Snowflake,
    ) -> ServiceResult<Target> {
        let repo = self.ctx.reaction_repo();
        repo.register_target(&Target::new(target_key.clone(), owner_id))
            .await?;
        let target = repo
            .find_target(target_key)
            .await?
            .ok_or_else(|| DomainError::TargetNotFound(target_key.to_string()))?;
        Ok(target)
    }

    /// Toggle `actor_id`'s reaction on a target
    ///
    /// # Errors
    /// - `Unauthorized` without an actor
    /// - `TargetNotFound` for an unregistered target
    /// - `TransientStoreConflict` once the store's retry budget is spent
    #[instrument(skip(self), fields(target = %target_key))]
    pub async fn toggle_reaction(
        &self,
        target_key: &TargetKey,
        actor_id: Option<Snowflake>,
        kind: ReactionKind,
        mode: ToggleMode,
    ) -> ServiceResult<ReactionState> {
        let user_id = actor_id.ok_or(DomainError::Unauthorized)?;

        let repo = self.ctx.reaction_repo();
        if repo.find_target(target_key).await?.is_none() {
            return Err(DomainError::TargetNotFound(target_key.to_string()).into());
        }

        let request = ToggleRequest {
            target_key: target_key.clone(),
            user_id,
            kind,
            mode,
            intent_id: self.ctx.generate_id(),
            requested_at: self.ctx.clock().now(),
        };
        let outcome = repo.toggle(&request).await?;

        if outcome.intent.is_some() {
            self.ctx.wake_outbox();
        }

        if outcome.changed {
            info!(
                user_id = %user_id,
                active = outcome.active,
                count = outcome.count,
                "Reaction toggled"
            );
        } else {
            debug!(user_id = %user_id, active = outcome.active, "Reaction unchanged");
        }

        Ok(ReactionState {
            active: outcome.active,
            count: outcome.count,
        })
    }

    /// Current reaction state of a target as seen by `user_id`
    #[instrument(skip(self), fields(target = %target_key))]
    pub async fn reaction_state(
        &self,
        target_key: &TargetKey,
        user_id: Snowflake,
        kind: ReactionKind,
    ) -> ServiceResult<ReactionState> {
        let repo = self.ctx.reaction_repo();
        let target = repo
            .find_target(target_key)
            .await?
            .ok_or_else(|| DomainError::TargetNotFound(target_key.to_string()))?;
        let active = repo.find(target_key, user_id, kind).await?.is_some();

        Ok(ReactionState {
            active,
            count: target.reaction_count,
        })
    }
}
