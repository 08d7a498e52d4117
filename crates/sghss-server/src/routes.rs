//! Route table.

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{appointments, auth, patients, status};
use crate::state::AppState;

/// Build the full API router with tracing and permissive CORS.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(status::api_status))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/profile", get(auth::profile))
        .route("/api/change-password", put(auth::change_password))
        .route("/api/pacientes", post(patients::create).get(patients::list))
        .route(
            "/api/pacientes/{id}",
            get(patients::get)
                .put(patients::update)
                .delete(patients::deactivate),
        )
        .route("/api/pacientes/{id}/reativar", put(patients::reactivate))
        .route(
            "/api/consultas",
            post(appointments::schedule).get(appointments::list),
        )
        .route("/api/consultas/{id}", get(appointments::get))
        .route("/api/consultas/{id}/status", put(appointments::update_status))
        .route(
            "/api/consultas/{id}/prontuario",
            post(appointments::create_record),
        )
        .route("/api/prontuarios/{id}", put(appointments::update_record))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
