//! Error taxonomy for SGHSS operations.
//!
//! Every service-layer failure is one of these variants. The HTTP boundary
//! is the single place that translates them into status codes.

use thiserror::Error;

/// Application error for SGHSS operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input; the client must fix the payload.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid credential, or a failed login.
    #[error("{0}")]
    Auth(String),

    /// Referenced entity is absent or logically deleted.
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness or scheduling collision.
    #[error("{0}")]
    Conflict(String),

    /// Anything else; caught at the boundary and reported as a 500.
    #[error("Erro interno do servidor: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create a new Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new Auth error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create a new NotFound error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a new Conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Create a new Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error is a client error (4xx category).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    /// Get error category for logging/monitoring.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Auth(_) => ErrorCategory::Auth,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::Conflict(_) => ErrorCategory::Conflict,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}

/// Error categories for monitoring and classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Auth,
    NotFound,
    Conflict,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Auth => write!(f, "auth"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Convenience result type for SGHSS operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_pass_through() {
        let err = ApiError::validation("CPF inválido");
        assert_eq!(err.to_string(), "CPF inválido");

        let err = ApiError::conflict("Paciente com este CPF já existe");
        assert_eq!(err.to_string(), "Paciente com este CPF já existe");
    }

    #[test]
    fn test_internal_error_prefixes_message() {
        let err = ApiError::internal("connection refused");
        assert_eq!(
            err.to_string(),
            "Erro interno do servidor: connection refused"
        );
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            ApiError::validation("x").category(),
            ErrorCategory::Validation
        );
        assert_eq!(ApiError::auth("x").category(), ErrorCategory::Auth);
        assert_eq!(ApiError::not_found("x").category(), ErrorCategory::NotFound);
        assert_eq!(ApiError::conflict("x").category(), ErrorCategory::Conflict);
        assert_eq!(ApiError::internal("x").category(), ErrorCategory::Internal);
    }

    #[test]
    fn test_client_vs_server_classification() {
        assert!(ApiError::validation("x").is_client_error());
        assert!(ApiError::auth("x").is_client_error());
        assert!(ApiError::not_found("x").is_client_error());
        assert!(ApiError::conflict("x").is_client_error());
        assert!(!ApiError::internal("x").is_client_error());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
        assert_eq!(ErrorCategory::NotFound.to_string(), "not_found");
        assert_eq!(ErrorCategory::Internal.to_string(), "internal");
    }
}
