//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use binge_common::AppError;
use binge_core::DomainError;
use std::fmt;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation or store failure
    Domain(DomainError),

    /// Application error (token, configuration)
    App(AppError),

    /// Request validation error
    Validation(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

impl ServiceError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether the caller may retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_retryable())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => AppError::status_for_domain(e),
            Self::App(e) => e.status_code(),
            Self::Validation(_) => 400,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use binge_core::Snowflake;

    #[test]
    fn test_domain_status_codes() {
        let cases = [
            (DomainError::Unauthorized, 401, "UNAUTHORIZED"),
            (DomainError::TargetNotFound("list:1".into()), 404, "UNKNOWN_TARGET"),
            (
                DomainError::NotificationNotFound(Snowflake::new(4)),
                404,
                "UNKNOWN_NOTIFICATION",
            ),
            (DomainError::InvalidTarget("x".into()), 400, "INVALID_TARGET"),
            (DomainError::PermissionDenied("x".into()), 403, "PERMISSION_DENIED"),
            (
                DomainError::TransientStoreConflict { attempts: 5 },
                503,
                "TRANSIENT_STORE_CONFLICT",
            ),
        ];
        for (domain, status, code) in cases {
            let err = ServiceError::from(domain);
            assert_eq!(err.status_code(), status);
            assert_eq!(err.error_code(), code);
        }
    }

    #[test]
    fn test_validation_error() {
        let err = ServiceError::validation("message is empty");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_convert_to_app_error() {
        let err = ServiceError::from(DomainError::TransientStoreConflict { attempts: 3 });
        assert!(err.is_retryable());
        let app_err: AppError = err.into();
        assert_eq!(app_err.status_code(), 503);
    }
}
