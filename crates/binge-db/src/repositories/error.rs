//! Error handling utilities for repositories

use binge_core::error::DomainError;
use sqlx::Error as SqlxError;

use crate::retry::AttemptError;

/// SQLSTATE codes that mean "run the whole unit again"
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const UNIQUE_VIOLATION: &str = "23505";

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Row that cannot be mapped back into a domain value
pub fn corrupt_row(what: &str, detail: impl std::fmt::Display) -> DomainError {
    DomainError::DatabaseError(format!("corrupt {what} row: {detail}"))
}

/// Classify an error raised inside a transactional unit
pub fn classify_attempt_error(e: SqlxError) -> AttemptError {
    let retryable = e.as_database_error().and_then(|db| db.code()).is_some_and(|code| {
        matches!(
            code.as_ref(),
            SERIALIZATION_FAILURE | DEADLOCK_DETECTED | UNIQUE_VIOLATION
        )
    });
    if retryable {
        AttemptError::Conflict(e.to_string())
    } else {
        AttemptError::Fatal(map_db_error(e))
    }
}

/// Escape `%`, `_` and `\` for use in a `LIKE ... ESCAPE '\'` pattern
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("review:1/season_2"), "review:1/season\\_2");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("list:9"), "list:9");
    }

    #[test]
    fn test_non_database_errors_are_fatal() {
        assert!(matches!(
            classify_attempt_error(SqlxError::RowNotFound),
            AttemptError::Fatal(DomainError::DatabaseError(_))
        ));
    }
}
