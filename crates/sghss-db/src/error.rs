//! Error types for the PostgreSQL storage layer.

use sghss_core::ApiError;
use sqlx_core::error::Error as SqlxError;

/// PostgreSQL error code for unique constraint violation (23505).
pub const PG_UNIQUE_VIOLATION: &str = "23505";

/// Checks if a sqlx error has a specific PostgreSQL error code.
pub fn has_pg_error_code(err: &SqlxError, code: &str) -> bool {
    if let SqlxError::Database(db_err) = err {
        db_err.code().as_deref() == Some(code)
    } else {
        false
    }
}

/// Errors specific to the PostgreSQL storage layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database error from sqlx.
    #[error("Database error: {0}")]
    Sqlx(#[from] SqlxError),

    /// Unique constraint violation, classified for the conflict taxonomy.
    #[error("{0}")]
    UniqueViolation(String),
}

impl DbError {
    /// Wrap a sqlx error, classifying unique violations with the given
    /// conflict message.
    pub fn classify(err: SqlxError, conflict_message: &str) -> Self {
        if has_pg_error_code(&err, PG_UNIQUE_VIOLATION) {
            Self::UniqueViolation(conflict_message.to_string())
        } else {
            Self::Sqlx(err)
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlx(e) => ApiError::internal(e.to_string()),
            DbError::UniqueViolation(message) => ApiError::conflict(message),
        }
    }
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let err = DbError::UniqueViolation("CPF já existe".into());
        let api: ApiError = err.into();
        assert!(matches!(api, ApiError::Conflict(_)));
        assert_eq!(api.to_string(), "CPF já existe");
    }

    #[test]
    fn test_sqlx_error_maps_to_internal() {
        let err = DbError::Sqlx(SqlxError::RowNotFound);
        let api: ApiError = err.into();
        assert!(matches!(api, ApiError::Internal(_)));
    }

    #[test]
    fn test_non_database_error_has_no_pg_code() {
        assert!(!has_pg_error_code(
            &SqlxError::RowNotFound,
            PG_UNIQUE_VIOLATION
        ));
    }
}
