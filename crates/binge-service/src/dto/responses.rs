//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;

use binge_core::{NotificationType, ReactionKind};

// ============================================================================
// Common Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// Reaction Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ReactionStateResponse {
    pub target_key: String,
    pub kind: ReactionKind,
    pub active: bool,
    pub count: i64,
}

// ============================================================================
// Notification Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_entity_key: Option<String>,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Grouped feed snapshot
#[derive(Debug, Clone, Serialize)]
pub struct NotificationFeedResponse {
    pub items: Vec<NotificationResponse>,
    pub unread_count: usize,
}

/// Result of `notify_on_event`
#[derive(Debug, Clone, Serialize)]
pub struct ComposeResponse {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
    pub removed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CascadeResponse {
    pub entity_key: String,
    pub recipients: usize,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each backing store
///
/// Each check is `healthy`, `unhealthy`, or the name of the in-process
/// fallback in use (`memory`, `local`).
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub cooldown: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbox_pending: Option<i64>,
}

impl HealthChecks {
    pub fn all_up(&self) -> bool {
        self.database != "unhealthy" && self.cooldown != "unhealthy"
    }
}

impl ReadinessResponse {
    pub fn from_checks(checks: HealthChecks) -> Self {
        let ready = checks.all_up();
        Self {
            status: if ready { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
