//! Outbox database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for notification_outbox table
#[derive(Debug, Clone, FromRow)]
pub struct OutboxModel {
    pub id: i64,
    pub recipient_id: i64,
    pub sender_id: i64,
    pub notification_type: String,
    pub related_entity_key: String,
    pub created_at: DateTime<Utc>,
}
