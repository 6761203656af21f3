//! Display names read from the profile subsystem's table

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{instrument, warn};

use binge_core::traits::{DisplayNameResolver, FALLBACK_DISPLAY_NAME};
use binge_core::value_objects::Snowflake;

/// Resolves display names from `profiles`
#[derive(Clone)]
pub struct PgDisplayNameResolver {
    pool: PgPool,
}

impl PgDisplayNameResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DisplayNameResolver for PgDisplayNameResolver {
    #[instrument(skip(self))]
    async fn resolve_display_name(&self, user_id: Snowflake) -> String {
        let result = sqlx::query_scalar::<_, String>(
            "SELECT display_name FROM profiles WHERE user_id = $1",
        )
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(name)) if !name.trim().is_empty() => name,
            Ok(_) => FALLBACK_DISPLAY_NAME.to_string(),
            Err(e) => {
                warn!(error = %e, "Display name lookup failed");
                FALLBACK_DISPLAY_NAME.to_string()
            }
        }
    }
}
