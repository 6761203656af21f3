//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Authentication Errors
    // =========================================================================
    #[error("Missing or mismatched actor")]
    Unauthorized,

    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("Notification not found: {0}")]
    NotificationNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    // =========================================================================
    // Concurrency Errors
    // =========================================================================
    #[error("Store conflict persisted after {attempts} attempts")]
    TransientStoreConflict { attempts: u32 },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",

            // Not Found
            Self::TargetNotFound(_) => "UNKNOWN_TARGET",
            Self::NotificationNotFound(_) => "UNKNOWN_NOTIFICATION",

            // Validation
            Self::InvalidTarget(_) => "INVALID_TARGET",
            Self::ValidationError(_) => "VALIDATION_ERROR",

            // Authorization
            Self::PermissionDenied(_) => "PERMISSION_DENIED",

            // Concurrency
            Self::TransientStoreConflict { .. } => "TRANSIENT_STORE_CONFLICT",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TargetNotFound(_) | Self::NotificationNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidTarget(_) | Self::ValidationError(_))
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Check if the caller may retry the same request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStoreConflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::TargetNotFound("list:1".to_string());
        assert_eq!(err.code(), "UNKNOWN_TARGET");

        let err = DomainError::TransientStoreConflict { attempts: 5 };
        assert_eq!(err.code(), "TRANSIENT_STORE_CONFLICT");
    }

    #[test]
    fn test_classification() {
        assert!(DomainError::NotificationNotFound(Snowflake::new(1)).is_not_found());
        assert!(!DomainError::Unauthorized.is_not_found());
        assert!(DomainError::InvalidTarget("x".to_string()).is_validation());
        assert!(DomainError::PermissionDenied("x".to_string()).is_authorization());
        assert!(DomainError::Unauthorized.is_unauthenticated());
        assert!(DomainError::TransientStoreConflict { attempts: 3 }.is_retryable());
        assert!(!DomainError::DatabaseError("down".to_string()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::NotificationNotFound(Snowflake::new(123));
        assert_eq!(err.to_string(), "Notification not found: 123");

        let err = DomainError::TransientStoreConflict { attempts: 5 };
        assert_eq!(err.to_string(), "Store conflict persisted after 5 attempts");
    }
}
