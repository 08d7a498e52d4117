//! Bearer token extractor for protected routes.
//!
//! Handlers that require authentication take a [`BearerAuth`] argument.
//! The extractor reads the `Authorization: Bearer <token>` header,
//! validates the token and hands the claims to the handler. Role tags are
//! carried in the claims but not enforced here.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AuthError;
use crate::token::{Claims, TokenService};

/// State required for bearer token authentication. Include it in the
/// application state and expose it via `FromRef`.
#[derive(Clone)]
pub struct AuthState {
    /// Token service for validation.
    pub tokens: Arc<TokenService>,
}

impl AuthState {
    /// Creates a new auth state around a token service.
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

/// Axum extractor that validates the bearer token and yields its claims.
#[derive(Debug)]
pub struct BearerAuth(pub Claims);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = auth_state
            .tokens
            .decode(token)
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(Self(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn state() -> AuthState {
        AuthState::new(Arc::new(TokenService::new("test-secret")))
    }

    #[tokio::test]
    async fn test_valid_token_yields_claims() {
        let state = state();
        let token = state.tokens.issue(7, "recepcao", "recepcionista").unwrap();

        let request = Request::builder()
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(())
            .unwrap();
        let (mut parts, ()) = request.into_parts();

        let BearerAuth(claims) = BearerAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(claims.account_id(), Some(7));
    }

    #[tokio::test]
    async fn test_missing_header_is_distinguished() {
        let request = Request::builder().body(()).unwrap();
        let (mut parts, ()) = request.into_parts();

        let err = BearerAuth::from_request_parts(&mut parts, &state())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));
    }

    #[tokio::test]
    async fn test_tampered_token_is_rejected() {
        let state = state();
        let token = state.tokens.issue(7, "recepcao", "recepcionista").unwrap();

        let request = Request::builder()
            .header(AUTHORIZATION, format!("Bearer {token}x"))
            .body(())
            .unwrap();
        let (mut parts, ()) = request.into_parts();

        let err = BearerAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }
}
