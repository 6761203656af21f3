//! Database models - SQLx-compatible structs for PostgreSQL tables

mod notification;
mod outbox;
mod reaction;

pub use notification::NotificationModel;
pub use outbox::OutboxModel;
pub use reaction::{ReactionModel, TargetModel};
