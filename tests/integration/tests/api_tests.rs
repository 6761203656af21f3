//! API Integration Tests
//!
//! HTTP surface checks: health, authentication, and error mapping.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_json, assert_status, fixtures::*, like_path, TestServer,
};
use reqwest::StatusCode;

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready_on_memory_store() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["checks"]["database"], "memory");
    assert_eq!(body["checks"]["cooldown"], "local");
    assert_eq!(body["checks"]["outbox_pending"], 0);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .get_auth("/api/v1/users/@me/notifications", unique_id())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_toggle_without_token_is_unauthorized() {
    let server = TestServer::start().await.expect("Failed to start server");
    let list = list_key(unique_id());
    server.register_target(&list, unique_id()).await;

    let response = server.put(&like_path(&list)).await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::UNAUTHORIZED)
        .await
        .unwrap();
    assert_eq!(error.error.code, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_feed_with_garbage_token_is_unauthorized() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .client
        .get(format!("{}/api/v1/users/@me/notifications", server.base_url()))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Error Mapping Tests
// ============================================================================

#[tokio::test]
async fn test_toggle_unknown_target_is_not_found() {
    let server = TestServer::start().await.expect("Failed to start server");
    let list = list_key(unique_id());

    let response = server.put_auth(&like_path(&list), unique_id()).await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(error.error.code, "UNKNOWN_TARGET");
}

#[tokio::test]
async fn test_invalid_target_type_is_bad_request() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .put_auth("/api/v1/targets/movie/5/reactions/like", unique_id())
        .await
        .unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .unwrap();
    assert_eq!(error.error.code, "INVALID_TARGET");
}

#[tokio::test]
async fn test_unknown_reaction_kind_is_bad_request() {
    let server = TestServer::start().await.expect("Failed to start server");
    let list = list_key(unique_id());
    server.register_target(&list, unique_id()).await;

    let path = format!("/api/v1/targets/list/{}/reactions/love", list.target_id());
    let response = server.put_auth(&path, unique_id()).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_oversized_message_is_rejected() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut request = NotifyEventRequest::follow(unique_id());
    request.message = "x".repeat(501);

    let response = server.notify(&request).await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .unwrap();
    assert_eq!(error.error.code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_event_report_requires_service_credential() {
    let server = TestServer::start().await.expect("Failed to start server");
    let (recipient, user) = (unique_id(), unique_id());
    let request = NotifyEventRequest::follow(recipient).sent_by(user);

    let response = server
        .post_auth("/api/v1/notifications/events", user, &request)
        .await
        .unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(error.error.code, "PERMISSION_DENIED");

    let response = server
        .client
        .post(format!("{}/api/v1/notifications/events", server.base_url()))
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server
        .get_auth("/api/v1/users/@me/notifications", recipient)
        .await
        .unwrap();
    let feed: FeedResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(feed.items.is_empty());
}

#[tokio::test]
async fn test_mark_read_of_foreign_notification_is_forbidden() {
    let server = TestServer::start().await.expect("Failed to start server");
    let recipient = unique_id();
    let sender = unique_id();

    let response = server
        .notify(&NotifyEventRequest::follow(recipient).sent_by(sender))
        .await
        .unwrap();
    let composed: ComposeResponse = assert_json(response, StatusCode::OK).await.unwrap();
    let id = composed.notification_id.expect("created notification id");

    let path = format!("/api/v1/notifications/{id}/read");
    let response = server.patch_auth(&path, sender).await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(error.error.code, "PERMISSION_DENIED");

    let response = server.patch_auth(&path, recipient).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
}

#[tokio::test]
async fn test_delete_missing_notification_is_not_found() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .delete_auth("/api/v1/notifications/987654321", unique_id())
        .await
        .unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(error.error.code, "UNKNOWN_NOTIFICATION");
}

#[tokio::test]
async fn test_malformed_notification_id_is_bad_request() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .delete_auth("/api/v1/notifications/abc", unique_id())
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Feed Tests
// ============================================================================

#[tokio::test]
async fn test_mark_all_read_clears_unread_count() {
    let server = TestServer::start().await.expect("Failed to start server");
    let recipient = unique_id();

    for _ in 0..2 {
        server
            .notify(&NotifyEventRequest::follow(recipient).sent_by(unique_id()))
            .await
            .unwrap();
    }

    let response = server
        .post_empty_auth("/api/v1/users/@me/notifications/read", recipient)
        .await
        .unwrap();
    let marked: MarkAllReadResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(marked.updated, 2);

    let response = server
        .get_auth("/api/v1/users/@me/notifications", recipient)
        .await
        .unwrap();
    let feed: FeedResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(feed.items.len(), 2);
    assert_eq!(feed.unread_count, 0);
    assert!(feed.items.iter().all(|item| item.read));
}
