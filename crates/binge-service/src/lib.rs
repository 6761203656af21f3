//! # binge-service
//!
//! Application layer containing the reaction toggle and the notification pipeline.
//!
//! ## Overview
//!
//! - **Services**: [`ReactionService`], [`NotificationService`] and the
//!   pipeline stages they drive ([`NotificationComposer`], [`NotificationCleaner`])
//! - **Grouping**: the pure feed grouper in [`services::grouper`]
//! - **Background work**: [`OutboxWorker`] drains notification intents
//! - **Live feeds**: [`FeedHub`] signals per-recipient subscribers
//! - **DTOs**: request/response types for the HTTP layer
//!
//! ## Usage
//!
//! ```rust,ignore
//! use binge_service::{ServiceContextBuilder, ReactionService};
//!
//! let ctx = ServiceContextBuilder::new()
//!     .reaction_repo(reactions)
//!     .notification_repo(notifications)
//!     .outbox_repo(outbox)
//!     .cooldown(cooldown)
//!     .display_names(profiles)
//!     .build()?;
//!
//! let state = ReactionService::new(&ctx)
//!     .toggle_reaction(&key, Some(user_id), ReactionKind::Like, ToggleMode::Toggle)
//!     .await?;
//! ```

pub mod dto;
pub mod services;

// Re-export commonly used types
pub use services::{
    ComposeOutcome, FeedHub, FeedSubscription, GroupedFeed, NotificationCleaner,
    NotificationComposer, NotificationService, NotificationStream, OutboxWorker,
    ReactionService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
};
