//! Shared application state.

use axum::extract::FromRef;
use sghss_auth::AuthState;
use sghss_db::PgPool;

/// State handed to every handler: the connection pool and the auth state
/// backing the bearer extractor.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth: AuthState,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
