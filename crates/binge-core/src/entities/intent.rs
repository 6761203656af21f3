//! Notification intent - outbox row written alongside a primary action

use chrono::{DateTime, Utc};

use crate::entities::NotificationType;
use crate::value_objects::{Snowflake, TargetKey};

/// A side effect recorded in the same commit as the action that caused it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationIntent {
    pub id: Snowflake,
    pub recipient_id: Snowflake,
    pub sender_id: Snowflake,
    pub notification_type: NotificationType,
    pub related_entity_key: String,
    pub created_at: DateTime<Utc>,
}

impl NotificationIntent {
    /// Intent for an activated reaction on a target owned by someone else
    pub fn for_reaction(
        id: Snowflake,
        owner_id: Snowflake,
        actor_id: Snowflake,
        target_key: &TargetKey,
        created_at: DateTime<Utc>,
    ) -> Option<Self> {
        if owner_id == actor_id {
            return None;
        }
        Some(Self {
            id,
            recipient_id: owner_id,
            sender_id: actor_id,
            notification_type: NotificationType::for_reaction_on(target_key.target_type()),
            related_entity_key: target_key.to_string(),
            created_at,
        })
    }
}
