//! Notification database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for notifications table
#[derive(Debug, Clone, FromRow)]
pub struct NotificationModel {
    pub id: i64,
    pub recipient_id: i64,
    pub notification_type: String,
    pub sender_id: Option<i64>,
    pub related_entity_key: Option<String>,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
