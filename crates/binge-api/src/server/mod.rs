//! Server setup and initialization
//!
//! Provides the application builders and the server runner.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use binge_cache::{InMemoryCooldownGuard, RedisCooldownGuard, RedisPool};
use binge_common::{AppConfig, AppError, TokenVerifier};
use binge_core::traits::CooldownGuard;
use binge_core::SnowflakeGenerator;
use binge_db::{
    create_pool, run_migrations, PgDisplayNameResolver, PgNotificationRepository,
    PgOutboxRepository, PgReactionRepository, RetryPolicy,
};
use binge_service::{OutboxWorker, ServiceContextBuilder};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

const COOLDOWN_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Build the application with the base middleware stack
pub fn create_app(state: AppState) -> Router {
    health_routes()
        .merge(apply_middleware(create_router()))
        .with_state(state)
}

/// Build the application with rate limiting and CORS from configuration
pub fn create_app_with_config(state: AppState, config: &AppConfig) -> Result<Router, AppError> {
    let api = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;
    Ok(health_routes().merge(api).with_state(state))
}

/// Select the cooldown backend: Redis when configured, process memory otherwise
fn create_cooldown(
    config: &AppConfig,
) -> Result<(Arc<dyn CooldownGuard>, Option<RedisPool>), AppError> {
    let ttl = config.notification.cooldown();

    if let Some(redis_config) = &config.redis {
        info!("Connecting to Redis...");
        let pool =
            RedisPool::from_config(redis_config).map_err(|e| AppError::Cache(e.to_string()))?;
        info!("Redis cooldown enabled");
        let guard: Arc<dyn CooldownGuard> = Arc::new(RedisCooldownGuard::new(pool.clone(), ttl));
        return Ok((guard, Some(pool)));
    }

    warn!("REDIS_URL not set, cooldown state is local to this process");
    let guard = Arc::new(InMemoryCooldownGuard::new(ttl));
    let janitor = Arc::clone(&guard);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(COOLDOWN_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            let purged = janitor.purge_expired();
            if purged > 0 {
                debug!(purged, "Expired cooldown entries removed");
            }
        }
    });
    let guard: Arc<dyn CooldownGuard> = guard;
    Ok((guard, None))
}

/// Initialize all dependencies and create AppState plus the outbox worker
async fn create_app_state(
    config: &AppConfig,
) -> Result<(AppState, OutboxWorker), AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&config.database)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    let (cooldown, redis) = create_cooldown(config)?;

    let reaction_repo = Arc::new(
        PgReactionRepository::new(pool.clone()).with_retry_policy(
            RetryPolicy::default().with_max_attempts(config.reaction.max_attempts),
        ),
    );
    let notification_repo = Arc::new(PgNotificationRepository::new(pool.clone()));
    let outbox_repo = Arc::new(PgOutboxRepository::new(pool.clone()));
    let display_names = Arc::new(PgDisplayNameResolver::new(pool.clone()));

    let service_context = ServiceContextBuilder::new()
        .reaction_repo(reaction_repo)
        .notification_repo(notification_repo)
        .outbox_repo(outbox_repo)
        .cooldown(cooldown)
        .display_names(display_names)
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .notification_config(config.notification.clone())
        .build()?;

    let worker = OutboxWorker::new(service_context.clone(), config.outbox.clone());

    let mut state = AppState::new(service_context, TokenVerifier::new(&config.jwt.secret))
        .with_database(pool);
    if let Some(redis) = redis {
        state = state.with_redis(redis);
    }
    Ok((state, worker))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn stop_worker(shutdown: watch::Sender<bool>, worker: JoinHandle<()>) {
    let _ = shutdown.send(true);
    if let Err(e) = worker.await {
        warn!(error = %e, "Outbox worker ended abnormally");
    }
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let (state, worker) = create_app_state(&config).await?;
    let app = create_app_with_config(state, &config)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = worker.spawn(shutdown_rx);

    let addr = config.api.address();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            stop_worker(shutdown_tx, worker).await;
            return Err(AppError::internal(
                anyhow::anyhow!(e).context(format!("failed to bind to {addr}")),
            ));
        }
    };
    info!("Server listening on http://{}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    stop_worker(shutdown_tx, worker).await;
    info!("Server stopped");

    served.map_err(|e| AppError::internal(anyhow::anyhow!(e).context("server error")))
}
