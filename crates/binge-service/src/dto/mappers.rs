//! Domain to DTO mappers
//!
//! Implements `From` conversions from domain values to response DTOs.

use binge_core::Notification;

use super::responses::{ComposeResponse, NotificationFeedResponse, NotificationResponse};
use crate::services::{ComposeOutcome, GroupedFeed};

impl From<&Notification> for NotificationResponse {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id.to_string(),
            notification_type: notification.notification_type,
            sender_id: notification.sender_id.map(|id| id.to_string()),
            related_entity_key: notification.related_entity_key.clone(),
            message: notification.message.clone(),
            read: notification.read,
            created_at: notification.created_at,
        }
    }
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self::from(&notification)
    }
}

impl From<GroupedFeed> for NotificationFeedResponse {
    fn from(feed: GroupedFeed) -> Self {
        Self {
            items: feed.items.iter().map(NotificationResponse::from).collect(),
            unread_count: feed.unread_count,
        }
    }
}

impl From<ComposeOutcome> for ComposeResponse {
    fn from(outcome: ComposeOutcome) -> Self {
        Self {
            outcome: outcome.as_str(),
            notification_id: outcome.notification_id().map(|id| id.to_string()),
        }
    }
}
