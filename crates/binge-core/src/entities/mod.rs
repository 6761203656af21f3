//! Domain entities - core business objects

mod intent;
mod notification;
mod reaction;

pub use intent::NotificationIntent;
pub use notification::{Notification, NotificationEvent, NotificationType};
pub use reaction::{
    Reaction, ReactionKind, ReactionState, Target, ToggleMode, ToggleOutcome, ToggleRequest,
};
