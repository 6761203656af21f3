//! End-to-end notification scenarios
//!
//! Each test drives the HTTP API against the in-memory store and moves the
//! manual clock to cross cooldown and merge windows.
//!
//! Run with: cargo test -p integration-tests --test scenario_tests

use std::sync::Arc;
use std::time::Duration as StdDuration;

use binge_core::{NotificationEvent, NotificationType, OutboxRepository, Snowflake};
use binge_service::NotificationService;
use chrono::Duration;
use futures::StreamExt;
use integration_tests::{assert_json, assert_status, fixtures::*, like_path, TestServer};
use reqwest::StatusCode;

async fn feed(server: &TestServer, user: Snowflake) -> FeedResponse {
    let response = server
        .get_auth("/api/v1/users/@me/notifications", user)
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

async fn like(server: &TestServer, path: &str, user: Snowflake) -> ReactionStateResponse {
    let response = server.put_auth(path, user).await.unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

// ============================================================================
// Reaction Scenarios
// ============================================================================

#[tokio::test]
async fn test_like_notifies_list_owner() {
    let server = TestServer::start().await.unwrap();
    let (u1, u2) = (unique_id(), unique_id());
    let list = list_key(unique_id());
    server.register_target(&list, u2).await;
    server.store.set_display_name(u1, "Ana");

    let state = like(&server, &like_path(&list), u1).await;
    assert!(state.active);
    assert_eq!(state.count, 1);
    assert_eq!(state.target_key, list.to_string());
    assert_eq!(state.kind, "like");

    assert_eq!(server.drain_outbox().await, 1);

    let feed = feed(&server, u2).await;
    assert_eq!(feed.unread_count, 1);
    assert_eq!(feed.items.len(), 1);
    let item = &feed.items[0];
    assert_eq!(item.notification_type, "LIST_REACTION");
    assert_eq!(item.related_entity_key.as_deref(), Some(list.to_string().as_str()));
    assert_eq!(item.sender_id.as_deref(), Some(u1.to_string().as_str()));
    assert_eq!(item.message, "Ana liked your list");
    assert!(!item.read);
}

#[tokio::test]
async fn test_unlike_keeps_sent_notification() {
    let server = TestServer::start().await.unwrap();
    let (u1, u2) = (unique_id(), unique_id());
    let list = list_key(unique_id());
    server.register_target(&list, u2).await;

    like(&server, &like_path(&list), u1).await;
    server.drain_outbox().await;

    let state = like(&server, &like_path(&list), u1).await;
    assert!(!state.active);
    assert_eq!(state.count, 0);
    assert_eq!(server.drain_outbox().await, 0);

    let feed = feed(&server, u2).await;
    assert_eq!(feed.items.len(), 1);
    assert_eq!(feed.unread_count, 1);
}

#[tokio::test]
async fn test_liking_own_list_sends_nothing() {
    let server = TestServer::start().await.unwrap();
    let owner = unique_id();
    let list = list_key(unique_id());
    server.register_target(&list, owner).await;

    let state = like(&server, &like_path(&list), owner).await;
    assert_eq!(state.count, 1);
    assert_eq!(server.drain_outbox().await, 0);
    assert!(feed(&server, owner).await.items.is_empty());
}

#[tokio::test]
async fn test_like_unlike_like_within_cooldown_notifies_once() {
    let server = TestServer::start().await.unwrap();
    let (u1, u2) = (unique_id(), unique_id());
    let list = list_key(unique_id());
    server.register_target(&list, u2).await;
    let path = like_path(&list);

    like(&server, &path, u1).await;
    like(&server, &path, u1).await;
    server.clock.advance(Duration::minutes(5));
    like(&server, &path, u1).await;

    assert_eq!(server.drain_outbox().await, 2);
    assert_eq!(server.store.pending_count().await.unwrap(), 0);
    assert_eq!(feed(&server, u2).await.items.len(), 1);

    // Past the cooldown the next like refreshes the existing row
    server.clock.advance(Duration::minutes(31));
    like(&server, &path, u1).await;
    like(&server, &path, u1).await;
    assert_eq!(server.drain_outbox().await, 1);

    let feed = feed(&server, u2).await;
    assert_eq!(feed.items.len(), 1);
    assert_eq!(feed.unread_count, 1);
}

#[tokio::test]
async fn test_concurrent_activations_count_once() {
    let server = Arc::new(TestServer::start().await.unwrap());
    let (actor, owner) = (unique_id(), unique_id());
    let list = list_key(unique_id());
    server.register_target(&list, owner).await;
    let path = format!("{}?mode=activate", like_path(&list));

    let mut handles = Vec::new();
    for _ in 0..12 {
        let server = Arc::clone(&server);
        let path = path.clone();
        handles.push(tokio::spawn(async move {
            let response = server.put_auth(&path, actor).await.unwrap();
            assert_json::<ReactionStateResponse>(response, StatusCode::OK)
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        let state = handle.await.unwrap();
        assert!(state.active);
        assert_eq!(state.count, 1);
    }

    for (key, counter, members) in server.store.counter_audit() {
        assert_eq!(counter, members, "counter drift on {key}");
    }
    assert_eq!(server.drain_outbox().await, 1);
}

#[tokio::test]
async fn test_concurrent_distinct_users_are_all_counted() {
    let server = Arc::new(TestServer::start().await.unwrap());
    let owner = unique_id();
    let list = list_key(unique_id());
    server.register_target(&list, owner).await;
    let path = like_path(&list);

    let mut handles = Vec::new();
    for _ in 0..10 {
        let server = Arc::clone(&server);
        let path = path.clone();
        handles.push(tokio::spawn(async move {
            let response = server.put_auth(&path, unique_id()).await.unwrap();
            assert_status(response, StatusCode::OK).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let response = server.get_auth(&path, owner).await.unwrap();
    let state: ReactionStateResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(state.count, 10);
    assert!(!state.active);
}

#[tokio::test]
async fn test_nested_target_counts_separately() {
    let server = TestServer::start().await.unwrap();
    let (u1, owner) = (unique_id(), unique_id());
    let review = review_key(unique_id());
    let season = review.clone().with_parent("season-1").unwrap();
    server.register_target(&review, owner).await;
    server.register_target(&season, owner).await;

    let state = like(&server, &like_path(&season), u1).await;
    assert_eq!(state.count, 1);
    assert_eq!(state.target_key, season.to_string());

    let response = server.get_auth(&like_path(&review), u1).await.unwrap();
    let state: ReactionStateResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(state.count, 0);
}

// ============================================================================
// Composition Scenarios
// ============================================================================

#[tokio::test]
async fn test_repeated_comments_merge_into_latest_text() {
    let server = TestServer::start().await.unwrap();
    let (u1, u3) = (unique_id(), unique_id());
    let review = review_key(unique_id());
    server.register_target(&review, u3).await;

    let mut outcomes = Vec::new();
    for text in ["first", "second", "third"] {
        let response = server
            .notify(&NotifyEventRequest::comment_on(&review, u3, text).sent_by(u1))
            .await
            .unwrap();
        let composed: ComposeResponse = assert_json(response, StatusCode::OK).await.unwrap();
        outcomes.push(composed.outcome);
        server.clock.advance(Duration::minutes(2));
    }
    assert_eq!(outcomes, ["created", "merged", "merged"]);

    let feed = feed(&server, u3).await;
    assert_eq!(feed.items.len(), 1);
    assert_eq!(feed.items[0].message, "third");
    assert_eq!(feed.items[0].notification_type, "REVIEW_COMMENT");
}

#[tokio::test]
async fn test_event_after_merge_window_creates_new_row() {
    let server = TestServer::start().await.unwrap();
    let (follower, recipient) = (unique_id(), unique_id());
    let follow = NotifyEventRequest::follow(recipient).sent_by(follower);

    let response = server.notify(&follow).await.unwrap();
    let first: ComposeResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(first.outcome, "created");

    server.clock.advance(Duration::hours(25));
    let response = server.notify(&follow).await.unwrap();
    let second: ComposeResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(second.outcome, "created");
    assert_ne!(first.notification_id, second.notification_id);

    // Both rows share a group, so the feed shows only the newest
    let grouped = feed(&server, recipient).await;
    assert_eq!(grouped.items.len(), 1);
    assert_eq!(Some(grouped.items[0].id.clone()), second.notification_id);
}

#[tokio::test]
async fn test_self_event_is_skipped() {
    let server = TestServer::start().await.unwrap();
    let user = unique_id();

    let response = server
        .notify(&NotifyEventRequest::follow(user).sent_by(user))
        .await
        .unwrap();
    let composed: ComposeResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(composed.outcome, "self_notification");
    assert!(composed.notification_id.is_none());
    assert!(feed(&server, user).await.items.is_empty());
}

// ============================================================================
// Cleanup Scenarios
// ============================================================================

#[tokio::test]
async fn test_cleanup_collapses_legacy_duplicates() {
    let server = TestServer::start().await.unwrap();
    let (u3, u4) = (unique_id(), unique_id());
    let event = NotificationEvent::new(u3, NotificationType::NewFollower, "started following you")
        .with_sender(u4);

    let mut newest = None;
    for hours in (1..=5).rev() {
        newest = Some(server.insert_legacy(&event, Duration::hours(hours)).await);
    }

    let response = server
        .post_empty_auth("/api/v1/users/@me/notifications/cleanup", u3)
        .await
        .unwrap();
    let cleaned: CleanupResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(cleaned.removed, 4);

    let response = server
        .post_empty_auth("/api/v1/users/@me/notifications/cleanup", u3)
        .await
        .unwrap();
    let again: CleanupResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(again.removed, 0);

    let feed = feed(&server, u3).await;
    assert_eq!(feed.items.len(), 1);
    assert_eq!(Some(feed.items[0].id.clone()), newest.map(|id| id.to_string()));
}

#[tokio::test]
async fn test_grouped_feed_is_stable_across_reads() {
    let server = TestServer::start().await.unwrap();
    let recipient = unique_id();
    let review = review_key(unique_id());
    server.register_target(&review, recipient).await;

    for _ in 0..3 {
        server
            .notify(&NotifyEventRequest::follow(recipient).sent_by(unique_id()))
            .await
            .unwrap();
        server
            .notify(
                &NotifyEventRequest::comment_on(&review, recipient, "nice").sent_by(unique_id()),
            )
            .await
            .unwrap();
        server.clock.advance(Duration::minutes(1));
    }

    let first = feed(&server, recipient).await;
    let second = feed(&server, recipient).await;
    let ids = |f: &FeedResponse| f.items.iter().map(|i| i.id.clone()).collect::<Vec<_>>();

    // Three follow groups plus one merged comment group
    assert_eq!(first.items.len(), 4);
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(first.unread_count, 4);
}

// ============================================================================
// Entity Lifecycle Scenarios
// ============================================================================

#[tokio::test]
async fn test_entity_cascade_removes_nested_notifications() {
    let server = TestServer::start().await.unwrap();
    let (a, b, sender) = (unique_id(), unique_id(), unique_id());
    let review = review_key(unique_id());
    let season = review.clone().with_parent("season-2").unwrap();
    server.register_target(&review, a).await;
    server.register_target(&season, b).await;

    for (recipient, key) in [(a, &review), (b, &season)] {
        let response = server
            .notify(&NotifyEventRequest::comment_on(key, recipient, "hello").sent_by(sender))
            .await
            .unwrap();
        assert_status(response, StatusCode::OK).await.unwrap();
    }

    let path = format!(
        "/api/v1/entities/review/{}/notifications",
        review.target_id()
    );
    let response = server.delete_auth(&path, a).await.unwrap();
    let cascade: CascadeResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(cascade.entity_key, review.to_string());
    assert_eq!(cascade.recipients, 2);

    assert!(feed(&server, a).await.items.is_empty());
    assert!(feed(&server, b).await.items.is_empty());
}

#[tokio::test]
async fn test_entity_cascade_by_non_owner_is_forbidden() {
    let server = TestServer::start().await.unwrap();
    let (owner, friend, stranger) = (unique_id(), unique_id(), unique_id());
    let list = list_key(unique_id());
    server.register_target(&list, owner).await;

    like(&server, &like_path(&list), friend).await;
    assert_eq!(server.drain_outbox().await, 1);

    let path = format!("/api/v1/entities/list/{}/notifications", list.target_id());
    let response = server.delete_auth(&path, stranger).await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(error.error.code, "PERMISSION_DENIED");
    assert_eq!(feed(&server, owner).await.items.len(), 1);

    let response = server.delete_auth(&path, friend).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let unknown = format!("/api/v1/entities/list/{}/notifications", unique_id());
    let response = server.delete_auth(&unknown, owner).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server.delete_auth(&path, owner).await.unwrap();
    let cascade: CascadeResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(cascade.recipients, 1);
    assert!(feed(&server, owner).await.items.is_empty());
}

#[tokio::test]
async fn test_user_cannot_overwrite_merged_comment() {
    let server = TestServer::start().await.unwrap();
    let (owner, friend, stranger) = (unique_id(), unique_id(), unique_id());
    let review = review_key(unique_id());
    server.register_target(&review, owner).await;

    let legit =
        NotifyEventRequest::comment_on(&review, owner, "Friend: great review").sent_by(friend);
    let response = server.notify(&legit).await.unwrap();
    let composed: ComposeResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(composed.outcome, "created");

    // A user token cannot reach the event hook at all
    let forged =
        NotifyEventRequest::comment_on(&review, owner, "click evil.example").sent_by(stranger);
    let response = server
        .post_auth("/api/v1/notifications/events", stranger, &forged)
        .await
        .unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(error.error.code, "PERMISSION_DENIED");

    // Nor may a service aim an entity event at someone who does not own the entity
    let misdirected =
        NotifyEventRequest::comment_on(&review, stranger, "click evil.example").sent_by(friend);
    let response = server.notify(&misdirected).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let owner_feed = feed(&server, owner).await;
    assert_eq!(owner_feed.items.len(), 1);
    assert_eq!(owner_feed.items[0].message, "Friend: great review");
    assert_eq!(
        owner_feed.items[0].sender_id.as_deref(),
        Some(friend.to_string().as_str())
    );
    assert!(feed(&server, stranger).await.items.is_empty());
}

// ============================================================================
// Live Feed
// ============================================================================

#[tokio::test]
async fn test_live_feed_follows_http_events() {
    let server = TestServer::start().await.unwrap();
    let (recipient, sender) = (unique_id(), unique_id());

    let mut stream = NotificationService::new(&server.ctx).grouped_feed(recipient);
    let initial = stream.next().await.unwrap().unwrap();
    assert!(initial.items.is_empty());

    server
        .notify(&NotifyEventRequest::follow(recipient).sent_by(sender))
        .await
        .unwrap();

    let update = tokio::time::timeout(StdDuration::from_secs(2), stream.next())
        .await
        .expect("feed update")
        .unwrap()
        .unwrap();
    assert_eq!(update.items.len(), 1);
    assert_eq!(update.unread_count, 1);
}
