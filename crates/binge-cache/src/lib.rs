//! # binge-cache
//!
//! Backing stores for the notification cooldown.
//!
//! ## Features
//!
//! - **In-memory guard**: per-process suppression window over `DashMap`,
//!   driven by an injected clock
//! - **Redis guard**: the same contract over `SET ... EX`, shared between
//!   instances that point at the same Redis
//! - **Connection Pool**: managed Redis connection pool with deadpool
//!
//! ## Example
//!
//! ```ignore
//! use binge_cache::{InMemoryCooldownGuard, RedisCooldownGuard, RedisPool};
//!
//! let local = InMemoryCooldownGuard::new(chrono::Duration::minutes(30));
//!
//! let pool = RedisPool::from_config(&redis_config)?;
//! let shared = RedisCooldownGuard::new(pool, chrono::Duration::minutes(30));
//! ```

pub mod cooldown;
pub mod pool;

pub use cooldown::{InMemoryCooldownGuard, RedisCooldownGuard};
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
