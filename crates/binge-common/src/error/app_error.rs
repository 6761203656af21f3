//! Application error types
//!
//! Errors raised outside the domain: token handling, configuration, startup.

use binge_core::DomainError;
use serde::Serialize;
use std::fmt;

use crate::config::ConfigError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authentication")]
    MissingAuth,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Infrastructure errors
    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::InvalidToken | Self::TokenExpired | Self::MissingAuth => 401,
            Self::Database(_) | Self::Cache(_) | Self::Internal(_) | Self::Config(_) => 500,
            Self::Domain(e) => Self::status_for_domain(e),
        }
    }

    /// HTTP status for a domain error, shared with the service layer
    #[must_use]
    pub fn status_for_domain(e: &DomainError) -> u16 {
        if e.is_unauthenticated() {
            401
        } else if e.is_not_found() {
            404
        } else if e.is_authorization() {
            403
        } else if e.is_validation() {
            400
        } else if e.is_retryable() {
            503
        } else {
            500
        }
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::MissingAuth => "MISSING_AUTH",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    #[must_use]
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code())
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Error body returned to clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.to_string(),
            details: None,
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use binge_core::Snowflake;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidToken.status_code(), 401);
        assert_eq!(AppError::Validation("x".to_string()).status_code(), 400);
        assert_eq!(AppError::Database("x".to_string()).status_code(), 500);
    }

    #[test]
    fn test_domain_status_codes() {
        let cases = [
            (DomainError::Unauthorized, 401),
            (DomainError::TargetNotFound("list:1".to_string()), 404),
            (DomainError::NotificationNotFound(Snowflake::new(1)), 404),
            (DomainError::InvalidTarget("x".to_string()), 400),
            (DomainError::PermissionDenied("x".to_string()), 403),
            (DomainError::TransientStoreConflict { attempts: 5 }, 503),
            (DomainError::InternalError("x".to_string()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_error_response() {
        let err = AppError::from(DomainError::InvalidTarget("missing ':'".to_string()));
        let response = ErrorResponse::from(&err);
        assert_eq!(response.code, "INVALID_TARGET");
        assert_eq!(response.message, "Invalid target: missing ':'");
        assert!(response.details.is_none());
    }

    #[test]
    fn test_config_error_is_server_error() {
        let err = AppError::from(ConfigError::MissingVar("DATABASE_URL"));
        assert!(err.is_server_error());
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
