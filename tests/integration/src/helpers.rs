//! Test helpers for integration tests
//!
//! Provides a test server over the in-memory store, authenticated request
//! helpers, and response assertions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use binge_api::{create_app, AppState};
use binge_cache::InMemoryCooldownGuard;
use binge_common::{NotificationConfig, OutboxConfig, TokenVerifier};
use binge_core::{
    Clock, ManualClock, Notification, NotificationEvent, NotificationRepository, ReactionRepository,
    Snowflake, Target, TargetKey,
};
use binge_db::MemoryStore;
use binge_service::{OutboxWorker, ServiceContext, ServiceContextBuilder};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const TEST_SECRET: &str = "integration-test-secret";

/// Caller id carried by the service credential
const SERVICE_CALLER: Snowflake = Snowflake::new(1);

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub ctx: ServiceContext,
    verifier: TokenVerifier,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server on an ephemeral port
    pub async fn start() -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::default());
        let config = NotificationConfig::default();
        let cooldown = Arc::new(InMemoryCooldownGuard::with_clock(
            config.cooldown(),
            clock.clone(),
        ));

        let ctx = ServiceContextBuilder::new()
            .reaction_repo(store.clone())
            .notification_repo(store.clone())
            .outbox_repo(store.clone())
            .display_names(store.clone())
            .cooldown(cooldown)
            .clock(clock.clone())
            .notification_config(config)
            .build()?;

        let state = AppState::new(ctx.clone(), TokenVerifier::new(TEST_SECRET));
        let app = create_app(state);

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            store,
            clock,
            ctx,
            verifier: TokenVerifier::new(TEST_SECRET),
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Bearer token for `user_id`
    pub fn token(&self, user_id: Snowflake) -> String {
        self.verifier
            .sign(user_id, chrono::Duration::hours(1))
            .expect("sign test token")
    }

    /// Service-scoped bearer token for subsystem endpoints
    pub fn service_token(&self) -> String {
        self.verifier
            .sign_service(SERVICE_CALLER, chrono::Duration::hours(1))
            .expect("sign service token")
    }

    /// Register a reactable target owned by `owner`
    pub async fn register_target(&self, key: &TargetKey, owner: Snowflake) {
        self.store
            .register_target(&Target::new(key.clone(), owner))
            .await
            .expect("register target");
    }

    /// Insert a feed row directly, bypassing composition
    pub async fn insert_legacy(
        &self,
        event: &NotificationEvent,
        age: chrono::Duration,
    ) -> Snowflake {
        let id = self.ctx.generate_id();
        let created_at = self.clock.now() - age;
        self.store
            .create(&Notification::new(id, event, created_at))
            .await
            .expect("insert notification");
        id
    }

    /// Deliver every pending intent synchronously
    pub async fn drain_outbox(&self) -> usize {
        OutboxWorker::new(self.ctx.clone(), OutboxConfig::default())
            .drain_once()
            .await
            .expect("drain outbox")
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, user_id: Snowflake) -> Result<Response> {
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(self.token(user_id))
            .send()
            .await?)
    }

    /// Make a PUT request without a token
    pub async fn put(&self, path: &str) -> Result<Response> {
        Ok(self.client.put(self.url(path)).send().await?)
    }

    /// Make a PUT request with auth token
    pub async fn put_auth(&self, path: &str, user_id: Snowflake) -> Result<Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(self.token(user_id))
            .send()
            .await?)
    }

    /// Make a POST request with JSON body and auth token
    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        user_id: Snowflake,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(self.token(user_id))
            .json(body)
            .send()
            .await?)
    }

    /// Report an event with the service credential
    pub async fn notify<T: Serialize>(&self, body: &T) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/api/v1/notifications/events"))
            .bearer_auth(self.service_token())
            .json(body)
            .send()
            .await?)
    }

    /// Make a POST request without a body
    pub async fn post_empty_auth(&self, path: &str, user_id: Snowflake) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(self.token(user_id))
            .send()
            .await?)
    }

    /// Make a PATCH request with auth token
    pub async fn patch_auth(&self, path: &str, user_id: Snowflake) -> Result<Response> {
        Ok(self
            .client
            .patch(self.url(path))
            .bearer_auth(self.token(user_id))
            .send()
            .await?)
    }

    /// Make a DELETE request with auth token
    pub async fn delete_auth(&self, path: &str, user_id: Snowflake) -> Result<Response> {
        Ok(self
            .client
            .delete(self.url(path))
            .bearer_auth(self.token(user_id))
            .send()
            .await?)
    }
}

/// Path of the like endpoint for `key`
pub fn like_path(key: &TargetKey) -> String {
    let mut path = format!(
        "/api/v1/targets/{}/{}/reactions/like",
        key.target_type(),
        key.target_id()
    );
    if let Some(parent) = key.parent_key() {
        path.push_str("?parent=");
        path.push_str(parent);
    }
    path
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status only
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}
