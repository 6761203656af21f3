//! Reaction handlers
//!
//! Endpoints for toggling and reading likes on reviews, lists and comments.

use axum::extract::State;
use binge_service::dto::ReactionStateResponse;
use binge_service::ReactionService;

use crate::extractors::{AuthUser, OptionalAuthUser, PathParams, TargetPath, TargetQuery};
use crate::response::{ApiJson, ApiResult};
use crate::state::AppState;

/// Toggle the caller's reaction
///
/// PUT /targets/{target_type}/{target_id}/reactions/{kind}?mode=&parent=
///
/// A missing bearer token reaches the service, which rejects it as `UNAUTHORIZED`.
pub async fn toggle_reaction(
    State(state): State<AppState>,
    auth: OptionalAuthUser,
    PathParams(path): PathParams<TargetPath>,
    query: TargetQuery,
) -> ApiResult<ApiJson<ReactionStateResponse>> {
    let target_key = path.target_key(query.parent())?;
    let kind = path.kind()?;

    let reaction_state = ReactionService::new(state.service_context())
        .toggle_reaction(&target_key, auth.user_id(), kind, query.mode)
        .await?;

    Ok(ApiJson(ReactionStateResponse {
        target_key: target_key.to_string(),
        kind,
        active: reaction_state.active,
        count: reaction_state.count,
    }))
}

/// Reaction state as seen by the caller
///
/// GET /targets/{target_type}/{target_id}/reactions/{kind}?parent=
pub async fn get_reaction_state(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(path): PathParams<TargetPath>,
    query: TargetQuery,
) -> ApiResult<ApiJson<ReactionStateResponse>> {
    let target_key = path.target_key(query.parent())?;
    let kind = path.kind()?;

    let reaction_state = ReactionService::new(state.service_context())
        .reaction_state(&target_key, auth.user_id, kind)
        .await?;

    Ok(ApiJson(ReactionStateResponse {
        target_key: target_key.to_string(),
        kind,
        active: reaction_state.active,
        count: reaction_state.count,
    }))
}
