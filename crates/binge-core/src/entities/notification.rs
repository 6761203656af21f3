//! Notification entity - one row of a user's notification feed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::{GroupKey, Snowflake, TargetType};

/// Notification types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    NewFollower,
    ReviewReaction,
    ListReaction,
    CommentReaction,
    ReviewComment,
    ListComment,
    CommentReply,
}

impl NotificationType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NewFollower => "NEW_FOLLOWER",
            Self::ReviewReaction => "REVIEW_REACTION",
            Self::ListReaction => "LIST_REACTION",
            Self::CommentReaction => "COMMENT_REACTION",
            Self::ReviewComment => "REVIEW_COMMENT",
            Self::ListComment => "LIST_COMMENT",
            Self::CommentReply => "COMMENT_REPLY",
        }
    }

    /// Notification type emitted when a reaction on this target type activates
    pub const fn for_reaction_on(target_type: TargetType) -> Self {
        match target_type {
            TargetType::Review => Self::ReviewReaction,
            TargetType::List => Self::ListReaction,
            TargetType::Comment => Self::CommentReaction,
        }
    }

    /// Whether each event of this type carries its own text
    ///
    /// Content-bearing events skip the cooldown so a merge-refresh always
    /// shows the latest text.
    pub const fn carries_content(&self) -> bool {
        matches!(
            self,
            Self::ReviewComment | Self::ListComment | Self::CommentReply
        )
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW_FOLLOWER" => Ok(Self::NewFollower),
            "REVIEW_REACTION" => Ok(Self::ReviewReaction),
            "LIST_REACTION" => Ok(Self::ListReaction),
            "COMMENT_REACTION" => Ok(Self::CommentReaction),
            "REVIEW_COMMENT" => Ok(Self::ReviewComment),
            "LIST_COMMENT" => Ok(Self::ListComment),
            "COMMENT_REPLY" => Ok(Self::CommentReply),
            other => Err(DomainError::ValidationError(format!(
                "unknown notification type '{other}'"
            ))),
        }
    }
}

/// Notification entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Snowflake,
    pub recipient_id: Snowflake,
    pub notification_type: NotificationType,
    pub sender_id: Option<Snowflake>,
    pub related_entity_key: Option<String>,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create a new unread notification
    pub fn new(id: Snowflake, event: &NotificationEvent, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            recipient_id: event.recipient_id,
            notification_type: event.notification_type,
            sender_id: event.sender_id,
            related_entity_key: event.related_entity_key.clone(),
            message: event.message.clone(),
            read: false,
            created_at,
        }
    }

    pub fn group_key(&self) -> GroupKey {
        GroupKey::derive(
            self.notification_type,
            self.sender_id,
            self.related_entity_key.as_deref(),
            self.id,
        )
    }

    /// Total order used to pick the surviving member of a group
    #[inline]
    pub fn recency(&self) -> (DateTime<Utc>, Snowflake) {
        (self.created_at, self.id)
    }

    /// Whether `related_entity_key` is `entity_key` or nested under it
    pub fn relates_to(&self, entity_key: &str) -> bool {
        self.related_entity_key.as_deref().is_some_and(|key| {
            key == entity_key
                || key
                    .strip_prefix(entity_key)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

/// A qualifying event that may become (or refresh) a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub recipient_id: Snowflake,
    pub notification_type: NotificationType,
    pub sender_id: Option<Snowflake>,
    pub related_entity_key: Option<String>,
    pub message: String,
}

impl NotificationEvent {
    pub fn new(
        recipient_id: Snowflake,
        notification_type: NotificationType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient_id,
            notification_type,
            sender_id: None,
            related_entity_key: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_sender(mut self, sender_id: Snowflake) -> Self {
        self.sender_id = Some(sender_id);
        self
    }

    #[must_use]
    pub fn with_entity(mut self, related_entity_key: impl Into<String>) -> Self {
        self.related_entity_key = Some(related_entity_key.into());
        self
    }

    /// Never notify a user about their own action
    pub fn is_self_notification(&self) -> bool {
        self.sender_id == Some(self.recipient_id)
    }

    pub fn group_key(&self) -> Option<GroupKey> {
        GroupKey::for_event(
            self.notification_type,
            self.sender_id,
            self.related_entity_key.as_deref(),
        )
    }
}
