//! Group and cooldown keys for notification deduplication

use std::fmt;

use crate::entities::NotificationType;
use crate::value_objects::Snowflake;

/// Logical identity used to collapse notification rows into one item
///
/// Entity-centric events (a comment on review X) group by the related entity;
/// identity-centric events (a new follower) group by the sender. A row with
/// neither stands alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    Entity {
        notification_type: NotificationType,
        entity_key: String,
    },
    Sender {
        notification_type: NotificationType,
        sender_id: Snowflake,
    },
    Single(Snowflake),
}

impl GroupKey {
    /// Group key for an incoming event, `None` when it cannot merge with anything
    pub fn for_event(
        notification_type: NotificationType,
        sender_id: Option<Snowflake>,
        related_entity_key: Option<&str>,
    ) -> Option<Self> {
        match (related_entity_key, sender_id) {
            (Some(entity_key), _) => Some(Self::Entity {
                notification_type,
                entity_key: entity_key.to_string(),
            }),
            (None, Some(sender_id)) => Some(Self::Sender {
                notification_type,
                sender_id,
            }),
            (None, None) => None,
        }
    }

    /// Group key of a persisted row
    pub fn derive(
        notification_type: NotificationType,
        sender_id: Option<Snowflake>,
        related_entity_key: Option<&str>,
        id: Snowflake,
    ) -> Self {
        Self::for_event(notification_type, sender_id, related_entity_key)
            .unwrap_or(Self::Single(id))
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity {
                notification_type,
                entity_key,
            } => write!(f, "{notification_type}@{entity_key}"),
            Self::Sender {
                notification_type,
                sender_id,
            } => write!(f, "{notification_type}#{sender_id}"),
            Self::Single(id) => write!(f, "single:{id}"),
        }
    }
}

/// Key of a cooldown entry: `(recipient, related entity, sender, type)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CooldownKey {
    pub recipient_id: Snowflake,
    pub related_entity_key: Option<String>,
    pub sender_id: Option<Snowflake>,
    pub notification_type: NotificationType,
}

impl CooldownKey {
    pub fn new(
        recipient_id: Snowflake,
        related_entity_key: Option<&str>,
        sender_id: Option<Snowflake>,
        notification_type: NotificationType,
    ) -> Self {
        Self {
            recipient_id,
            related_entity_key: related_entity_key.map(str::to_string),
            sender_id,
            notification_type,
        }
    }

    /// Flat string form for key-value backends
    pub fn cache_key(&self) -> String {
        let entity = self.related_entity_key.as_deref().unwrap_or("-");
        let sender = self
            .sender_id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        format!(
            "cooldown:{}:{}:{}:{}",
            self.recipient_id, self.notification_type, entity, sender
        )
    }
}
