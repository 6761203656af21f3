//! Entity to model mappers
//!
//! Conversions between domain entities (binge-core) and database models.
//! Rows hold enums and keys as text, so reading is fallible (`TryFrom`).

mod notification;
mod outbox;
mod reaction;

pub use notification::NotificationInsert;
pub use outbox::OutboxInsert;
