//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in binge-core.

pub(crate) mod error;
mod notification;
mod outbox;
mod profile;
mod reaction;

pub use notification::PgNotificationRepository;
pub use outbox::PgOutboxRepository;
pub use profile::PgDisplayNameResolver;
pub use reaction::PgReactionRepository;
