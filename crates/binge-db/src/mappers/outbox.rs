//! Notification intent <-> outbox model mapper

use binge_core::entities::NotificationIntent;
use binge_core::error::DomainError;
use binge_core::value_objects::Snowflake;

use crate::models::OutboxModel;
use crate::repositories::error::corrupt_row;

impl TryFrom<OutboxModel> for NotificationIntent {
    type Error = DomainError;

    fn try_from(model: OutboxModel) -> Result<Self, Self::Error> {
        Ok(NotificationIntent {
            id: Snowflake::new(model.id),
            recipient_id: Snowflake::new(model.recipient_id),
            sender_id: Snowflake::new(model.sender_id),
            notification_type: model
                .notification_type
                .parse()
                .map_err(|e| corrupt_row("outbox", e))?,
            related_entity_key: model.related_entity_key,
            created_at: model.created_at,
        })
    }
}

/// Bind values for inserting an outbox row
pub struct OutboxInsert<'a> {
    pub id: i64,
    pub recipient_id: i64,
    pub sender_id: i64,
    pub notification_type: &'static str,
    pub related_entity_key: &'a str,
}

impl<'a> OutboxInsert<'a> {
    pub fn new(intent: &'a NotificationIntent) -> Self {
        Self {
            id: intent.id.into_inner(),
            recipient_id: intent.recipient_id.into_inner(),
            sender_id: intent.sender_id.into_inner(),
            notification_type: intent.notification_type.as_str(),
            related_entity_key: &intent.related_entity_key,
        }
    }
}
