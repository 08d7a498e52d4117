//! Single translation point from the error taxonomy to HTTP responses.
//!
//! Handlers return `Result<_, ErrorResponse>`; `?` lifts service and
//! storage errors into the taxonomy, and this module maps each category
//! to its status code with an `{"error": message}` body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use sghss_core::ApiError;
use sghss_db::DbError;

/// Wrapper carrying an [`ApiError`] out of a handler.
#[derive(Debug)]
pub struct ErrorResponse(pub ApiError);

impl ErrorResponse {
    fn status(&self) -> StatusCode {
        match self.0 {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Unhandled error reached the HTTP boundary");
        }
        let body = json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl From<DbError> for ErrorResponse {
    fn from(err: DbError) -> Self {
        Self(ApiError::from(err))
    }
}

impl From<sghss_db::SqlxError> for ErrorResponse {
    fn from(err: sghss_db::SqlxError) -> Self {
        Self(ApiError::from(DbError::from(err)))
    }
}

impl From<serde_json::Error> for ErrorResponse {
    fn from(err: serde_json::Error) -> Self {
        Self(ApiError::internal(err.to_string()))
    }
}

/// Result type for handlers.
pub type ApiResult<T> = std::result::Result<T, ErrorResponse>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::validation("x"), StatusCode::BAD_REQUEST),
            (ApiError::auth("x"), StatusCode::UNAUTHORIZED),
            (ApiError::not_found("x"), StatusCode::NOT_FOUND),
            (ApiError::conflict("x"), StatusCode::CONFLICT),
            (ApiError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ErrorResponse(err).status(), expected);
        }
    }

    #[test]
    fn test_db_conflict_becomes_409() {
        let err = DbError::UniqueViolation("CPF já existe".into());
        assert_eq!(ErrorResponse::from(err).status(), StatusCode::CONFLICT);
    }
}
