//! Cooldown window shared through Redis

use async_trait::async_trait;
use binge_core::traits::CooldownGuard;
use binge_core::value_objects::CooldownKey;
use chrono::{Duration, Utc};
use redis::AsyncCommands;
use tracing::warn;

use crate::pool::{RedisPool, RedisResult};

/// Cooldown entries stored as expiring Redis keys
///
/// Redis failures degrade to "not suppressed"; the merge window still
/// prevents duplicate rows.
#[derive(Debug, Clone)]
pub struct RedisCooldownGuard {
    pool: RedisPool,
    ttl_secs: u64,
}

impl RedisCooldownGuard {
    pub fn new(pool: RedisPool, ttl: Duration) -> Self {
        Self {
            pool,
            ttl_secs: ttl.num_seconds().max(1) as u64,
        }
    }

    async fn exists(&self, key: &str) -> RedisResult<bool> {
        let mut conn = self.pool.get().await?;
        Ok(conn.exists(key).await?)
    }

    async fn set(&self, key: &str) -> RedisResult<()> {
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(key, Utc::now().timestamp(), self.ttl_secs)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CooldownGuard for RedisCooldownGuard {
    async fn should_suppress(&self, key: &CooldownKey) -> bool {
        let cache_key = key.cache_key();
        match self.exists(&cache_key).await {
            Ok(present) => present,
            Err(e) => {
                warn!(key = %cache_key, error = %e, "Cooldown lookup failed");
                false
            }
        }
    }

    async fn mark_attempted(&self, key: &CooldownKey) {
        let cache_key = key.cache_key();
        if let Err(e) = self.set(&cache_key).await {
            warn!(key = %cache_key, error = %e, "Cooldown write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::RedisPoolConfig;
    use binge_core::entities::NotificationType;
    use binge_core::value_objects::Snowflake;

    fn key() -> CooldownKey {
        CooldownKey::new(
            Snowflake::new(1),
            None,
            Some(Snowflake::new(2)),
            NotificationType::NewFollower,
        )
    }

    #[tokio::test]
    async fn test_unreachable_redis_does_not_suppress() {
        let pool = RedisPool::new(RedisPoolConfig {
            url: "redis://127.0.0.1:1".to_string(),
            max_connections: 1,
        })
        .unwrap();
        let guard = RedisCooldownGuard::new(pool, Duration::minutes(30));

        guard.mark_attempted(&key()).await;
        assert!(!guard.should_suppress(&key()).await);
    }

    #[tokio::test]
    async fn test_round_trip_against_live_redis() {
        let Ok(url) = std::env::var("REDIS_URL") else {
            eprintln!("Skipping test: REDIS_URL not set");
            return;
        };
        let pool = RedisPool::new(RedisPoolConfig {
            url,
            max_connections: 2,
        })
        .unwrap();
        let guard = RedisCooldownGuard::new(pool, Duration::seconds(5));
        let key = CooldownKey::new(
            Snowflake::new(Utc::now().timestamp_micros()),
            Some("review:1"),
            Some(Snowflake::new(2)),
            NotificationType::ReviewReaction,
        );

        assert!(!guard.should_suppress(&key).await);
        guard.mark_attempted(&key).await;
        assert!(guard.should_suppress(&key).await);
    }
}
