//! # binge-db
//!
//! Storage layer implementing the repository ports of `binge-core`.
//!
//! ## Overview
//!
//! - PostgreSQL repositories via SQLx, with the toggle unit executed in a
//!   single transaction and retried on serialization conflicts
//! - The embedded schema and [`run_migrations`]
//! - Database models and entity mappers
//! - [`MemoryStore`], an in-process implementation of the same ports
//!
//! ## Usage
//!
//! ```rust,ignore
//! use binge_db::{create_pool, run_migrations, PgReactionRepository};
//!
//! async fn example(config: &binge_common::DatabaseConfig) -> Result<(), sqlx::Error> {
//!     let pool = create_pool(config).await?;
//!     run_migrations(&pool).await?;
//!     let reactions = PgReactionRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;
pub mod retry;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations, PgPool};
pub use repositories::{
    PgDisplayNameResolver, PgNotificationRepository, PgOutboxRepository, PgReactionRepository,
};
pub use retry::{run_with_retry, AttemptError, RetryPolicy};
