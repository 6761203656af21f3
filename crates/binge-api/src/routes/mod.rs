//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers::{entities, health, notifications, reactions};
use crate::state::AppState;

/// Create the main API router (health routes are mounted separately)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(reaction_routes())
        .merge(notification_routes())
        .merge(entity_routes())
}

/// Reaction routes
fn reaction_routes() -> Router<AppState> {
    Router::new().route(
        "/targets/:target_type/:target_id/reactions/:kind",
        put(reactions::toggle_reaction).get(reactions::get_reaction_state),
    )
}

/// Notification routes
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications/events", post(notifications::notify_event))
        .route("/users/@me/notifications", get(notifications::get_notifications))
        .route("/users/@me/notifications/read", post(notifications::mark_all_read))
        .route("/users/@me/notifications/cleanup", post(notifications::cleanup))
        .route(
            "/notifications/:notification_id/read",
            patch(notifications::mark_read),
        )
        .route(
            "/notifications/:notification_id",
            delete(notifications::delete_notification),
        )
}

/// Entity lifecycle routes
fn entity_routes() -> Router<AppState> {
    Router::new().route(
        "/entities/:target_type/:target_id/notifications",
        delete(entities::delete_entity_notifications),
    )
}
