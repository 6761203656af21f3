//! Test fixtures and data generators
//!
//! Provides reusable request bodies and response shapes for integration tests.

use binge_core::{NotificationType, Snowflake, TargetKey, TargetType};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

/// Counter for unique test ids
static COUNTER: AtomicI64 = AtomicI64::new(1_000);

/// Get a unique Snowflake for test data
pub fn unique_id() -> Snowflake {
    Snowflake::new(COUNTER.fetch_add(1, Ordering::SeqCst))
}

pub fn list_key(id: Snowflake) -> TargetKey {
    TargetKey::new(TargetType::List, id)
}

pub fn review_key(id: Snowflake) -> TargetKey {
    TargetKey::new(TargetType::Review, id)
}

/// Event report body
#[derive(Debug, Serialize)]
pub struct NotifyEventRequest {
    pub recipient_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_entity_key: Option<String>,
    pub message: String,
}

impl NotifyEventRequest {
    pub fn comment_on(review: &TargetKey, owner: Snowflake, message: impl Into<String>) -> Self {
        Self {
            recipient_id: owner.to_string(),
            sender_id: None,
            notification_type: NotificationType::ReviewComment,
            related_entity_key: Some(review.to_string()),
            message: message.into(),
        }
    }

    pub fn follow(recipient: Snowflake) -> Self {
        Self {
            recipient_id: recipient.to_string(),
            sender_id: None,
            notification_type: NotificationType::NewFollower,
            related_entity_key: None,
            message: "started following you".to_string(),
        }
    }

    pub fn sent_by(mut self, sender: Snowflake) -> Self {
        self.sender_id = Some(sender.to_string());
        self
    }
}

/// Reaction state response
#[derive(Debug, Deserialize)]
pub struct ReactionStateResponse {
    pub target_key: String,
    pub kind: String,
    pub active: bool,
    pub count: i64,
}

/// Notification response
#[derive(Debug, Deserialize)]
pub struct NotificationResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub sender_id: Option<String>,
    pub related_entity_key: Option<String>,
    pub message: String,
    pub read: bool,
}

/// Grouped feed response
#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    pub items: Vec<NotificationResponse>,
    pub unread_count: usize,
}

/// Compose outcome response
#[derive(Debug, Deserialize)]
pub struct ComposeResponse {
    pub outcome: String,
    pub notification_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CleanupResponse {
    pub removed: u64,
}

#[derive(Debug, Deserialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

#[derive(Debug, Deserialize)]
pub struct CascadeResponse {
    pub entity_key: String,
    pub recipients: usize,
}

/// Error response
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
