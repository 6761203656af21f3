//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! the token verifier, and the backing pools probed by readiness checks.

use std::sync::Arc;

use binge_cache::RedisPool;
use binge_common::TokenVerifier;
use binge_db::PgPool;
use binge_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Service context containing all dependencies
    service_context: Arc<ServiceContext>,
    token_verifier: Arc<TokenVerifier>,
    /// `None` when running on the in-memory store
    database: Option<PgPool>,
    /// `None` when the cooldown is process-local
    redis: Option<RedisPool>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service_context: ServiceContext, token_verifier: TokenVerifier) -> Self {
        Self {
            service_context: Arc::new(service_context),
            token_verifier: Arc::new(token_verifier),
            database: None,
            redis: None,
        }
    }

    #[must_use]
    pub fn with_database(mut self, pool: PgPool) -> Self {
        self.database = Some(pool);
        self
    }

    #[must_use]
    pub fn with_redis(mut self, pool: RedisPool) -> Self {
        self.redis = Some(pool);
        self
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn token_verifier(&self) -> &TokenVerifier {
        &self.token_verifier
    }

    pub fn database(&self) -> Option<&PgPool> {
        self.database.as_ref()
    }

    pub fn redis(&self) -> Option<&RedisPool> {
        self.redis.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("database", &self.database.is_some())
            .field("redis", &self.redis.is_some())
            .finish()
    }
}
