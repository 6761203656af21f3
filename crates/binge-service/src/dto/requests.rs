//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize`; bodies also implement `Validate`.

use serde::Deserialize;
use validator::Validate;

use binge_core::{NotificationType, ToggleMode};

// ============================================================================
// Reaction Requests
// ============================================================================

/// Query string of `PUT /targets/{type}/{id}/reactions/{kind}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToggleReactionQuery {
    /// `toggle` when absent
    #[serde(default)]
    pub mode: ToggleMode,
    /// Parent segment of the target key, e.g. a season within a review
    pub parent: Option<String>,
}

// ============================================================================
// Notification Requests
// ============================================================================

/// Event reported by another subsystem on behalf of `sender_id`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NotifyEventRequest {
    pub recipient_id: String,

    /// Absent for system events
    pub sender_id: Option<String>,

    #[serde(rename = "type")]
    pub notification_type: NotificationType,

    #[validate(length(min = 1, max = 200, message = "Entity key must be 1-200 characters"))]
    pub related_entity_key: Option<String>,

    #[validate(length(min = 1, max = 500, message = "Message must be 1-500 characters"))]
    pub message: String,
}
