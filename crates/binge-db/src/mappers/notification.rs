//! Notification entity <-> model mapper

use binge_core::entities::Notification;
use binge_core::error::DomainError;
use binge_core::value_objects::Snowflake;

use crate::models::NotificationModel;
use crate::repositories::error::corrupt_row;

impl TryFrom<NotificationModel> for Notification {
    type Error = DomainError;

    fn try_from(model: NotificationModel) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: Snowflake::new(model.id),
            recipient_id: Snowflake::new(model.recipient_id),
            notification_type: model
                .notification_type
                .parse()
                .map_err(|e| corrupt_row("notification", e))?,
            sender_id: model.sender_id.map(Snowflake::new),
            related_entity_key: model.related_entity_key,
            message: model.message,
            read: model.read,
            created_at: model.created_at,
        })
    }
}

/// Bind values for inserting a notification
pub struct NotificationInsert<'a> {
    pub id: i64,
    pub recipient_id: i64,
    pub notification_type: &'static str,
    pub sender_id: Option<i64>,
    pub related_entity_key: Option<&'a str>,
    pub message: &'a str,
}

impl<'a> NotificationInsert<'a> {
    pub fn new(notification: &'a Notification) -> Self {
        Self {
            id: notification.id.into_inner(),
            recipient_id: notification.recipient_id.into_inner(),
            notification_type: notification.notification_type.as_str(),
            sender_id: notification.sender_id.map(Snowflake::into_inner),
            related_entity_key: notification.related_entity_key.as_deref(),
            message: &notification.message,
        }
    }
}
