//! # binge-core
//!
//! Domain layer containing entities, value objects, repository traits, and the clock port.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod clock;
pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use entities::{
    Notification, NotificationEvent, NotificationIntent, NotificationType, Reaction,
    ReactionKind, ReactionState, Target, ToggleMode, ToggleOutcome, ToggleRequest,
};
pub use error::DomainError;
pub use traits::{
    CooldownGuard, DisplayNameResolver, NotificationRepository, OutboxRepository,
    ReactionRepository, RepoResult, FALLBACK_DISPLAY_NAME,
};
pub use value_objects::{
    CooldownKey, GroupKey, Snowflake, SnowflakeGenerator, SnowflakeParseError, TargetKey,
    TargetType, MAX_PARENT_KEY_LEN,
};
