//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    /// Present only when `REDIS_URL` is set; selects the shared cooldown store
    pub redis: Option<RedisConfig>,
    pub jwt: JwtConfig,
    pub notification: NotificationConfig,
    pub outbox: OutboxConfig,
    pub reaction: ReactionConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(ConfigError::InvalidValue("APP_ENV", other.to_string())),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// JWT verification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

/// Deduplication windows for the notification pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_merge_window_hours")]
    pub merge_window_hours: i64,
    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes: i64,
}

impl NotificationConfig {
    #[must_use]
    pub fn merge_window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.merge_window_hours)
    }

    #[must_use]
    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cooldown_minutes)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            merge_window_hours: default_merge_window_hours(),
            cooldown_minutes: default_cooldown_minutes(),
        }
    }
}

/// Outbox worker configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutboxConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
    #[serde(default = "default_lease_secs")]
    pub lease_secs: i64,
}

impl OutboxConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn lease(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.lease_secs)
    }
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            batch_size: default_batch_size(),
            lease_secs: default_lease_secs(),
        }
    }
}

/// Reaction toggle retry budget
#[derive(Debug, Clone, Deserialize)]
pub struct ReactionConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "binge-server".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_merge_window_hours() -> i64 {
    24
}

fn default_cooldown_minutes() -> i64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_batch_size() -> i64 {
    50
}

fn default_lease_secs() -> i64 {
    60
}

fn default_max_attempts() -> u32 {
    5
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

/// Parse an optional raw value, falling back to `default` when absent
fn parse_or<T: FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
    }
}

fn var(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    var(name).ok_or(ConfigError::MissingVar(name))
}

fn optional<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    parse_or(name, var(name), default)
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            app: AppSettings {
                name: var("APP_NAME").unwrap_or_else(default_app_name),
                env: optional("APP_ENV", Environment::default())?,
            },
            api: ServerConfig {
                host: var("API_HOST").unwrap_or_else(default_host),
                port: parse_or("API_PORT", Some(required("API_PORT")?), 0)?,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: optional("DATABASE_MAX_CONNECTIONS", default_max_connections())?,
                min_connections: optional("DATABASE_MIN_CONNECTIONS", default_min_connections())?,
            },
            redis: match var("REDIS_URL") {
                Some(url) => Some(RedisConfig {
                    url,
                    max_connections: optional(
                        "REDIS_MAX_CONNECTIONS",
                        default_redis_max_connections(),
                    )?,
                }),
                None => None,
            },
            jwt: JwtConfig {
                secret: required("JWT_SECRET")?,
            },
            notification: NotificationConfig {
                merge_window_hours: optional(
                    "NOTIFICATION_MERGE_WINDOW_HOURS",
                    default_merge_window_hours(),
                )?,
                cooldown_minutes: optional(
                    "NOTIFICATION_COOLDOWN_MINUTES",
                    default_cooldown_minutes(),
                )?,
            },
            outbox: OutboxConfig {
                poll_interval_ms: optional("OUTBOX_POLL_INTERVAL_MS", default_poll_interval_ms())?,
                batch_size: optional("OUTBOX_BATCH_SIZE", default_batch_size())?,
                lease_secs: optional("OUTBOX_LEASE_SECS", default_lease_secs())?,
            },
            reaction: ReactionConfig {
                max_attempts: optional("REACTION_MAX_ATTEMPTS", default_max_attempts())?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: optional(
                    "RATE_LIMIT_REQUESTS_PER_SECOND",
                    default_requests_per_second(),
                )?,
                burst: optional("RATE_LIMIT_BURST", default_burst())?,
            },
            cors: CorsConfig {
                allowed_origins: var("CORS_ALLOWED_ORIGINS")
                    .map(|s| s.split(',').map(str::trim).map(String::from).collect())
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig {
                worker_id: optional("WORKER_ID", 0)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    ///
    /// # Errors
    /// Returns the first offending variable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notification.merge_window_hours <= 0 {
            return Err(ConfigError::InvalidValue(
                "NOTIFICATION_MERGE_WINDOW_HOURS",
                self.notification.merge_window_hours.to_string(),
            ));
        }
        if self.notification.cooldown_minutes < 0 {
            return Err(ConfigError::InvalidValue(
                "NOTIFICATION_COOLDOWN_MINUTES",
                self.notification.cooldown_minutes.to_string(),
            ));
        }
        if self.outbox.batch_size <= 0 {
            return Err(ConfigError::InvalidValue(
                "OUTBOX_BATCH_SIZE",
                self.outbox.batch_size.to_string(),
            ));
        }
        if self.reaction.max_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "REACTION_MAX_ATTEMPTS",
                "0".to_string(),
            ));
        }
        if self.snowflake.worker_id > 1023 {
            return Err(ConfigError::InvalidValue(
                "WORKER_ID",
                self.snowflake.worker_id.to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
