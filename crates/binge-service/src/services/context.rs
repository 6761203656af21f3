//! Service context - dependency container for services
//!
//! Holds the store ports, the cooldown guard, the clock, and the signalling
//! handles shared between request handlers and the outbox worker.

use std::sync::Arc;

use tokio::sync::Notify;

use binge_common::NotificationConfig;
use binge_core::traits::{
    CooldownGuard, DisplayNameResolver, NotificationRepository, OutboxRepository,
    ReactionRepository,
};
use binge_core::{Clock, Snowflake, SnowflakeGenerator, SystemClock};

use super::error::{ServiceError, ServiceResult};
use super::feed::FeedHub;

/// Service context containing all dependencies
///
/// Cheap to clone: every field is reference counted. The outbox worker keeps
/// its own clone; request handlers borrow the one in the application state.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    reaction_repo: Arc<dyn ReactionRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    outbox_repo: Arc<dyn OutboxRepository>,

    // Collaborators
    cooldown: Arc<dyn CooldownGuard>,
    display_names: Arc<dyn DisplayNameResolver>,
    clock: Arc<dyn Clock>,
    snowflake_generator: Arc<SnowflakeGenerator>,

    // Signalling
    feed_hub: FeedHub,
    outbox_signal: Arc<Notify>,

    notification_config: NotificationConfig,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reaction_repo: Arc<dyn ReactionRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
        outbox_repo: Arc<dyn OutboxRepository>,
        cooldown: Arc<dyn CooldownGuard>,
        display_names: Arc<dyn DisplayNameResolver>,
        clock: Arc<dyn Clock>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        notification_config: NotificationConfig,
    ) -> Self {
        Self {
            reaction_repo,
            notification_repo,
            outbox_repo,
            cooldown,
            display_names,
            clock,
            snowflake_generator,
            feed_hub: FeedHub::new(),
            outbox_signal: Arc::new(Notify::new()),
            notification_config,
        }
    }

    // === Repositories ===

    /// Get the reaction repository
    pub fn reaction_repo(&self) -> &dyn ReactionRepository {
        self.reaction_repo.as_ref()
    }

    /// Get the notification repository
    pub fn notification_repo(&self) -> &dyn NotificationRepository {
        self.notification_repo.as_ref()
    }

    /// Owned handle to the notification repository, for `'static` streams
    pub fn notification_repo_handle(&self) -> Arc<dyn NotificationRepository> {
        Arc::clone(&self.notification_repo)
    }

    /// Get the outbox repository
    pub fn outbox_repo(&self) -> &dyn OutboxRepository {
        self.outbox_repo.as_ref()
    }

    // === Collaborators ===

    pub fn cooldown(&self) -> &dyn CooldownGuard {
        self.cooldown.as_ref()
    }

    pub fn display_names(&self) -> &dyn DisplayNameResolver {
        self.display_names.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    pub fn notification_config(&self) -> &NotificationConfig {
        &self.notification_config
    }

    // === Signalling ===

    pub fn feed_hub(&self) -> &FeedHub {
        &self.feed_hub
    }

    /// Handle the outbox worker waits on
    pub fn outbox_signal(&self) -> Arc<Notify> {
        Arc::clone(&self.outbox_signal)
    }

    /// Wake the outbox worker without waiting for it
    pub fn wake_outbox(&self) {
        self.outbox_signal.notify_one();
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("cooldown", &"dyn CooldownGuard")
            .field("notification_config", &self.notification_config)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
///
/// The clock, id generator and notification windows have defaults; the store
/// ports and collaborators are required.
pub struct ServiceContextBuilder {
    reaction_repo: Option<Arc<dyn ReactionRepository>>,
    notification_repo: Option<Arc<dyn NotificationRepository>>,
    outbox_repo: Option<Arc<dyn OutboxRepository>>,
    cooldown: Option<Arc<dyn CooldownGuard>>,
    display_names: Option<Arc<dyn DisplayNameResolver>>,
    clock: Option<Arc<dyn Clock>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    notification_config: Option<NotificationConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            reaction_repo: None,
            notification_repo: None,
            outbox_repo: None,
            cooldown: None,
            display_names: None,
            clock: None,
            snowflake_generator: None,
            notification_config: None,
        }
    }

    pub fn reaction_repo(mut self, repo: Arc<dyn ReactionRepository>) -> Self {
        self.reaction_repo = Some(repo);
        self
    }

    pub fn notification_repo(mut self, repo: Arc<dyn NotificationRepository>) -> Self {
        self.notification_repo = Some(repo);
        self
    }

    pub fn outbox_repo(mut self, repo: Arc<dyn OutboxRepository>) -> Self {
        self.outbox_repo = Some(repo);
        self
    }

    pub fn cooldown(mut self, guard: Arc<dyn CooldownGuard>) -> Self {
        self.cooldown = Some(guard);
        self
    }

    pub fn display_names(mut self, resolver: Arc<dyn DisplayNameResolver>) -> Self {
        self.display_names = Some(resolver);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn notification_config(mut self, config: NotificationConfig) -> Self {
        self.notification_config = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.reaction_repo
                .ok_or_else(|| ServiceError::validation("reaction_repo is required"))?,
            self.notification_repo
                .ok_or_else(|| ServiceError::validation("notification_repo is required"))?,
            self.outbox_repo
                .ok_or_else(|| ServiceError::validation("outbox_repo is required"))?,
            self.cooldown
                .ok_or_else(|| ServiceError::validation("cooldown is required"))?,
            self.display_names
                .ok_or_else(|| ServiceError::validation("display_names is required"))?,
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            self.snowflake_generator
                .unwrap_or_else(|| Arc::new(SnowflakeGenerator::default())),
            self.notification_config.unwrap_or_default(),
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
