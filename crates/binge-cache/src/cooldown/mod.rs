//! Cooldown guard implementations

mod local;
mod shared;

pub use local::InMemoryCooldownGuard;
pub use shared::RedisCooldownGuard;
