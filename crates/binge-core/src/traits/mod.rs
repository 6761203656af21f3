//! Traits (ports) - interfaces implemented by the infrastructure layer

mod ports;
mod repositories;

pub use ports::{CooldownGuard, DisplayNameResolver, FALLBACK_DISPLAY_NAME};
pub use repositories::{
    NotificationRepository, OutboxRepository, ReactionRepository, RepoResult,
};
