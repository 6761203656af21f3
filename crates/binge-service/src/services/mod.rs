//! Service layer - business logic and use cases
//!
//! Each service borrows a [`ServiceContext`] for its dependencies. Stages that
//! sit downstream of a committed action (composer, cleaner, outbox) log their
//! failures instead of returning them.

pub mod cleaner;
pub mod composer;
pub mod context;
pub mod error;
pub mod feed;
pub mod grouper;
pub mod notification;
pub mod outbox;
pub mod reaction;

pub use cleaner::NotificationCleaner;
pub use composer::{ComposeOutcome, NotificationComposer};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use feed::{FeedHub, FeedSubscription};
pub use grouper::GroupedFeed;
pub use notification::{NotificationService, NotificationStream};
pub use outbox::OutboxWorker;
pub use reaction::ReactionService;
