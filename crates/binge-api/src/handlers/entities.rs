//! Entity lifecycle hooks
//!
//! Called by the subsystems that own reviews, lists and comments.

use axum::extract::State;
use binge_service::dto::CascadeResponse;
use binge_service::NotificationService;
use tracing::info;

use crate::extractors::{AuthUser, EntityPath, PathParams};
use crate::response::{ApiJson, ApiResult};
use crate::state::AppState;

/// Remove notifications about a deleted entity and everything nested under it
///
/// Only the entity's owner may call it.
///
/// DELETE /entities/{target_type}/{target_id}/notifications
pub async fn delete_entity_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(path): PathParams<EntityPath>,
) -> ApiResult<ApiJson<CascadeResponse>> {
    let entity = path.target_key()?;
    info!(caller = %auth.user_id, entity_key = %entity, "Entity cascade requested");

    let recipients = NotificationService::new(state.service_context())
        .delete_for_entity(&entity, auth.user_id)
        .await?;

    Ok(ApiJson(CascadeResponse {
        entity_key: entity.to_string(),
        recipients,
    }))
}
