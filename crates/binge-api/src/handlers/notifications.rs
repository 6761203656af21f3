//! Notification handlers
//!
//! Endpoints for the caller's notification feed and for reporting events.

use axum::extract::State;
use binge_core::{NotificationEvent, Snowflake};
use binge_service::dto::{
    CleanupResponse, ComposeResponse, MarkAllReadResponse, NotificationFeedResponse,
    NotifyEventRequest,
};
use binge_service::NotificationService;
use tracing::debug;

use crate::extractors::{AuthUser, NotificationIdPath, PathParams, ServiceCaller, ValidatedJson};
use crate::response::{ApiError, ApiJson, ApiResult, NoContent};
use crate::state::AppState;

/// Report an event from another subsystem
///
/// POST /notifications/events
pub async fn notify_event(
    State(state): State<AppState>,
    caller: ServiceCaller,
    ValidatedJson(request): ValidatedJson<NotifyEventRequest>,
) -> ApiResult<ApiJson<ComposeResponse>> {
    let recipient_id: Snowflake = request
        .recipient_id
        .parse()
        .map_err(|_| ApiError::invalid_body("Invalid recipient_id format"))?;

    let mut event = NotificationEvent::new(recipient_id, request.notification_type, request.message);
    if let Some(sender_id) = request.sender_id {
        let sender_id: Snowflake = sender_id
            .parse()
            .map_err(|_| ApiError::invalid_body("Invalid sender_id format"))?;
        event = event.with_sender(sender_id);
    }
    if let Some(entity_key) = request.related_entity_key {
        event = event.with_entity(entity_key);
    }
    debug!(caller = %caller.caller_id, "Event reported");

    let outcome = NotificationService::new(state.service_context())
        .report_event(&event)
        .await?;
    Ok(ApiJson(outcome.into()))
}

/// Grouped feed with unread count
///
/// GET /users/@me/notifications
pub async fn get_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiJson<NotificationFeedResponse>> {
    let feed = NotificationService::new(state.service_context())
        .list_grouped(auth.user_id)
        .await?;
    Ok(ApiJson(feed.into()))
}

/// POST /users/@me/notifications/read
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiJson<MarkAllReadResponse>> {
    let updated = NotificationService::new(state.service_context())
        .mark_all_read(auth.user_id)
        .await?;
    Ok(ApiJson(MarkAllReadResponse { updated }))
}

/// Remove superseded rows from the caller's feed
///
/// POST /users/@me/notifications/cleanup
pub async fn cleanup(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiJson<CleanupResponse> {
    let removed = NotificationService::new(state.service_context())
        .cleanup(auth.user_id)
        .await;
    ApiJson(CleanupResponse { removed })
}

/// PATCH /notifications/{notification_id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(path): PathParams<NotificationIdPath>,
) -> ApiResult<NoContent> {
    NotificationService::new(state.service_context())
        .mark_read(path.notification_id()?, auth.user_id)
        .await?;
    Ok(NoContent)
}

/// DELETE /notifications/{notification_id}
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(path): PathParams<NotificationIdPath>,
) -> ApiResult<NoContent> {
    NotificationService::new(state.service_context())
        .delete_notification(path.notification_id()?, auth.user_id)
        .await?;
    Ok(NoContent)
}
